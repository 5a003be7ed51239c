//! Exclusion Set
//!
//! Addresses whose market cap has exceeded the ceiling. Entries are never
//! removed: a later valuation below the ceiling does not readmit a token.

use std::collections::HashSet;

/// Default market cap ceiling in USD
pub const DEFAULT_MARKET_CAP_CEILING: f64 = 2_000_000.0;

#[derive(Debug, Clone)]
pub struct ExclusionSet {
    ceiling: f64,
    excluded: HashSet<String>,
}

impl ExclusionSet {
    pub fn new(ceiling: f64) -> Self {
        Self {
            ceiling,
            excluded: HashSet::new(),
        }
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn contains(&self, address: &str) -> bool {
        self.excluded.contains(address)
    }

    pub fn exceeds_ceiling(&self, market_cap: f64) -> bool {
        market_cap > self.ceiling
    }

    /// Tombstone `address` if `market_cap` is over the ceiling.
    /// Returns true if the address is excluded after the call.
    pub fn check(&mut self, address: &str, market_cap: f64) -> bool {
        if self.exceeds_ceiling(market_cap) {
            if self.excluded.insert(address.to_string()) {
                tracing::info!(
                    "Excluding {}: market cap {:.0} above ceiling {:.0}",
                    address,
                    market_cap,
                    self.ceiling
                );
            }
            return true;
        }
        self.contains(address)
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_MARKET_CAP_CEILING)
    }
}
