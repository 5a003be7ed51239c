//! Token Ledger
//!
//! In-memory map of tracked addresses with a size ceiling. Records are only
//! ever inserted or mutated, never removed.

use std::collections::HashMap;

use thiserror::Error;

use super::token::TokenRecord;

/// Default maximum number of tracked tokens
pub const DEFAULT_LEDGER_CAPACITY: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Ledger full ({0} entries)")]
    AtCapacity(usize),

    #[error("Address already tracked: {0}")]
    AlreadyTracked(String),
}

#[derive(Debug, Clone)]
pub struct TokenLedger {
    capacity: usize,
    records: HashMap<String, TokenRecord>,
}

impl TokenLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn contains(&self, address: &str) -> bool {
        self.records.contains_key(address)
    }

    pub fn get(&self, address: &str) -> Option<&TokenRecord> {
        self.records.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut TokenRecord> {
        self.records.get_mut(address)
    }

    /// Insert a new record. Fails if the address is present or the ledger is full.
    pub fn insert(&mut self, record: TokenRecord) -> Result<(), LedgerError> {
        if self.records.contains_key(&record.address) {
            return Err(LedgerError::AlreadyTracked(record.address));
        }
        if self.is_full() {
            return Err(LedgerError::AtCapacity(self.capacity));
        }
        self.records.insert(record.address.clone(), record);
        Ok(())
    }

    pub fn addresses(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// All records ordered by address
    pub fn sorted_records(&self) -> Vec<TokenRecord> {
        let mut records: Vec<TokenRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.address.cmp(&b.address));
        records
    }
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{BoostedToken, HolderConcentration, Valuation};
    use chrono::Utc;

    fn record(address: &str) -> TokenRecord {
        TokenRecord::new(
            &BoostedToken::new(address, "", 1.0),
            Valuation::new(100_000.0, 0.0, 0.0001),
            HolderConcentration::Unavailable,
            Utc::now(),
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut ledger = TokenLedger::default();
        assert_eq!(ledger.capacity(), DEFAULT_LEDGER_CAPACITY);

        ledger.insert(record("a")).unwrap();
        assert!(ledger.contains("a"));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get("b").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut ledger = TokenLedger::new(5);
        ledger.insert(record("a")).unwrap();
        assert_eq!(
            ledger.insert(record("a")),
            Err(LedgerError::AlreadyTracked("a".to_string()))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_capacity_enforced() {
        let mut ledger = TokenLedger::new(2);
        ledger.insert(record("a")).unwrap();
        ledger.insert(record("b")).unwrap();
        assert!(ledger.is_full());
        assert_eq!(ledger.insert(record("c")), Err(LedgerError::AtCapacity(2)));

        // Existing records stay mutable when full
        ledger.get_mut("a").unwrap().update_price(1.0, Utc::now());
        assert_eq!(ledger.get("a").unwrap().current_price.value, 1.0);
    }

    #[test]
    fn test_sorted_records() {
        let mut ledger = TokenLedger::new(10);
        for addr in ["c", "a", "b"] {
            ledger.insert(record(addr)).unwrap();
        }
        let order: Vec<String> = ledger.sorted_records().into_iter().map(|r| r.address).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
