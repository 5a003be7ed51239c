//! Boost Tracker
//!
//! Reconciles each feed batch into the token ledger and periodically refreshes
//! the valuations of everything tracked.
//!
//! Per feed token:
//! 1. Excluded addresses are ignored.
//! 2. A tracked address whose boost matches its initial or last recorded boost
//!    is left alone without fetching anything.
//! 3. Otherwise a valuation is fetched. Failures skip the token for this cycle;
//!    a market cap above the ceiling tombstones it.
//! 4. New addresses are admitted while the ledger has room, with holder
//!    concentration captured once.
//! 5. Tracked addresses with a changed boost get a history entry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::config::RefreshMode;
use crate::domain::{
    shorten_number, BoostedToken, ExclusionSet, HolderConcentration, TokenLedger, TokenRecord,
    Valuation,
};
use crate::ports::{HolderSource, PriceOracle, ValuationSource};

/// Outcome of one refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Records whose current value was overwritten
    pub updated: usize,
    /// Records left untouched for lack of usable data
    pub skipped: usize,
    /// Records newly tombstoned for exceeding the ceiling
    pub excluded: usize,
    /// Updates that raised a watermark
    pub new_highs: usize,
}

/// Reconciliation engine owning the ledger, exclusions and per-cycle cache
pub struct BoostTracker {
    valuations: Arc<dyn ValuationSource>,
    holders: Arc<dyn HolderSource>,
    oracle: Arc<dyn PriceOracle>,
    ledger: TokenLedger,
    exclusion: ExclusionSet,
    cycle_cache: HashMap<String, Valuation>,
    mode: RefreshMode,
}

impl BoostTracker {
    pub fn new(
        valuations: Arc<dyn ValuationSource>,
        holders: Arc<dyn HolderSource>,
        oracle: Arc<dyn PriceOracle>,
        ledger: TokenLedger,
        exclusion: ExclusionSet,
    ) -> Self {
        Self {
            valuations,
            holders,
            oracle,
            ledger,
            exclusion,
            cycle_cache: HashMap::new(),
            mode: RefreshMode::default(),
        }
    }

    /// Builder method to choose how valuations are refreshed
    pub fn with_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn exclusion(&self) -> &ExclusionSet {
        &self.exclusion
    }

    /// Forget valuations from the previous cycle
    pub fn clear_cycle_cache(&mut self) {
        self.cycle_cache.clear();
    }

    /// Merge one feed batch into the ledger.
    /// Returns true if any record was created or gained a history entry.
    pub async fn reconcile(&mut self, tokens: &[BoostedToken]) -> bool {
        let mut changed = false;

        for token in tokens {
            if self.exclusion.contains(&token.address) {
                continue;
            }

            let tracked = self.ledger.get(&token.address);
            if tracked.is_some_and(|r| r.has_seen_boost(token.boost)) {
                continue;
            }
            let is_new = tracked.is_none();

            let Some(valuation) = self.valuation_for(&token.address).await else {
                continue;
            };

            if self.exclusion.check(&token.address, valuation.market_cap) {
                continue;
            }

            if is_new {
                changed |= self.admit(token, valuation).await;
            } else if let Some(record) = self.ledger.get_mut(&token.address) {
                tracing::info!(
                    "Boost change {}: {} -> {} (mc {})",
                    token.address,
                    record.last_boost().unwrap_or(record.initial_boost),
                    token.boost,
                    shorten_number(valuation.market_cap)
                );
                record.record_boost_change(token.boost, valuation, Utc::now());
                changed = true;
            }
        }

        changed
    }

    /// Cached valuation for this cycle, else a fresh fetch. `None` when unusable.
    async fn valuation_for(&mut self, address: &str) -> Option<Valuation> {
        if let Some(valuation) = self.cycle_cache.get(address) {
            return Some(*valuation);
        }

        match self.valuations.fetch_valuation(address).await {
            Ok(valuation) if valuation.is_valid() => {
                self.cycle_cache.insert(address.to_string(), valuation);
                Some(valuation)
            }
            Ok(valuation) => {
                tracing::warn!("Invalid valuation for {}: {:?}", address, valuation);
                None
            }
            Err(e) => {
                tracing::warn!("Valuation fetch failed for {}: {}", address, e);
                None
            }
        }
    }

    async fn admit(&mut self, token: &BoostedToken, valuation: Valuation) -> bool {
        if self.ledger.is_full() {
            tracing::debug!(
                "Ledger full ({}), not tracking {}",
                self.ledger.capacity(),
                token.address
            );
            return false;
        }

        let concentration = match self.holders.fetch_concentration(&token.address).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Holder data unavailable for {}: {}", token.address, e);
                HolderConcentration::Unavailable
            }
        };

        let record = TokenRecord::new(token, valuation, concentration, Utc::now());
        match self.ledger.insert(record) {
            Ok(()) => {
                tracing::info!(
                    "New token {} boost {} mc {} top10 {}",
                    token.address,
                    token.boost,
                    shorten_number(valuation.market_cap),
                    concentration
                        .top10_pct()
                        .map(|p| format!("{:.1}%", p))
                        .unwrap_or_else(|| "n/a".to_string())
                );
                true
            }
            Err(e) => {
                tracing::warn!("Could not track {}: {}", token.address, e);
                false
            }
        }
    }

    /// Update current values (and watermarks) of every non-excluded record
    pub async fn refresh_valuations(&mut self) -> RefreshReport {
        let addresses: Vec<String> = self
            .ledger
            .addresses()
            .into_iter()
            .filter(|a| !self.exclusion.contains(a))
            .collect();

        let report = match self.mode {
            RefreshMode::Price => self.refresh_prices(addresses).await,
            RefreshMode::MarketCap => self.refresh_market_caps(addresses).await,
        };

        tracing::info!(
            "Refresh ({:?}): {} updated, {} skipped, {} excluded, {} new highs",
            self.mode,
            report.updated,
            report.skipped,
            report.excluded,
            report.new_highs
        );
        report
    }

    async fn refresh_prices(&mut self, addresses: Vec<String>) -> RefreshReport {
        let mut prices: HashMap<String, f64> = HashMap::new();
        let mut remaining = Vec::new();

        for address in &addresses {
            match self.cycle_cache.get(address) {
                Some(v) if v.price > 0.0 => {
                    prices.insert(address.clone(), v.price);
                }
                _ => remaining.push(address.clone()),
            }
        }

        if !remaining.is_empty() {
            match self.oracle.fetch_prices(&remaining).await {
                Ok(fetched) => prices.extend(fetched),
                Err(e) => tracing::warn!("Price oracle failed for {} tokens: {}", remaining.len(), e),
            }
        }

        let mut report = RefreshReport::default();
        let now = Utc::now();

        for address in &addresses {
            let Some(record) = self.ledger.get_mut(address) else {
                continue;
            };
            match prices.get(address) {
                Some(&price) if price.is_finite() && price > 0.0 => {
                    report.updated += 1;
                    if record.update_price(price, now) {
                        report.new_highs += 1;
                    }
                }
                _ => {
                    tracing::debug!("No usable price for {}", address);
                    report.skipped += 1;
                }
            }
        }

        report
    }

    async fn refresh_market_caps(&mut self, addresses: Vec<String>) -> RefreshReport {
        let mut report = RefreshReport::default();
        let now = Utc::now();

        for address in addresses {
            let Some(valuation) = self.valuation_for(&address).await else {
                report.skipped += 1;
                continue;
            };

            if self.exclusion.check(&address, valuation.market_cap) {
                report.excluded += 1;
                continue;
            }

            if let Some(record) = self.ledger.get_mut(&address) {
                let new_mc_high = record.update_market_cap(valuation.market_cap, now);
                let new_price_high = valuation.price > 0.0 && record.update_price(valuation.price, now);
                report.updated += 1;
                if new_mc_high || new_price_high {
                    report.new_highs += 1;
                }
            }
        }

        report
    }
}
