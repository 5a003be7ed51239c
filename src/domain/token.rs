//! Tracked Token Records
//!
//! Data model for boosted tokens: feed entries, valuations, holder
//! concentration and the per-address record kept in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token as reported by the boost feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedToken {
    /// Token mint address
    pub address: String,
    /// DexScreener page for the token
    pub url: String,
    /// Total boost amount currently reported
    pub boost: f64,
}

impl BoostedToken {
    pub fn new(address: impl Into<String>, url: impl Into<String>, boost: f64) -> Self {
        Self {
            address: address.into(),
            url: url.into(),
            boost,
        }
    }
}

/// Market data for a single token at one point in time (USD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    /// Fully diluted valuation
    pub market_cap: f64,
    /// 24h volume
    pub volume: f64,
    /// Price per token
    pub price: f64,
}

impl Valuation {
    pub fn new(market_cap: f64, volume: f64, price: f64) -> Self {
        Self {
            market_cap,
            volume,
            price,
        }
    }

    /// Usable for tracking: positive finite market cap and a finite, non-negative price
    pub fn is_valid(&self) -> bool {
        self.market_cap.is_finite()
            && self.market_cap > 0.0
            && self.price.is_finite()
            && self.price >= 0.0
    }
}

/// A value paired with the time it was observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}

/// Supply share held by the largest holders, captured once at detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum HolderConcentration {
    Available {
        top10_pct: f64,
        top25_pct: f64,
        top50_pct: f64,
        holders_sampled: usize,
    },
    Unavailable,
}

impl HolderConcentration {
    pub fn is_available(&self) -> bool {
        matches!(self, HolderConcentration::Available { .. })
    }

    pub fn top10_pct(&self) -> Option<f64> {
        match self {
            HolderConcentration::Available { top10_pct, .. } => Some(*top10_pct),
            HolderConcentration::Unavailable => None,
        }
    }
}

/// One observed boost change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub market_cap: f64,
    pub volume: f64,
    pub price: f64,
    pub boost: f64,
    pub timestamp: DateTime<Utc>,
}

/// Everything known about a tracked address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub address: String,
    pub url: String,
    pub initial_boost: f64,
    pub initial_market_cap: f64,
    pub initial_volume: f64,
    pub holder_concentration: HolderConcentration,
    pub initial_price: PricePoint,
    pub highest_price: PricePoint,
    pub current_price: PricePoint,
    pub highest_market_cap: PricePoint,
    pub current_market_cap: PricePoint,
    /// Append-only, in detection order
    pub history: Vec<HistoryEntry>,
}

impl TokenRecord {
    /// Build a record from the first observation of a token
    pub fn new(
        token: &BoostedToken,
        valuation: Valuation,
        holder_concentration: HolderConcentration,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let price = PricePoint::new(valuation.price, observed_at);
        let market_cap = PricePoint::new(valuation.market_cap, observed_at);

        Self {
            address: token.address.clone(),
            url: token.url.clone(),
            initial_boost: token.boost,
            initial_market_cap: valuation.market_cap,
            initial_volume: valuation.volume,
            holder_concentration,
            initial_price: price,
            highest_price: price,
            current_price: price,
            highest_market_cap: market_cap,
            current_market_cap: market_cap,
            history: Vec::new(),
        }
    }

    /// Boost of the most recent history entry, if any
    pub fn last_boost(&self) -> Option<f64> {
        self.history.last().map(|h| h.boost)
    }

    /// True when `boost` matches either the initial boost or the last recorded one
    pub fn has_seen_boost(&self, boost: f64) -> bool {
        self.initial_boost == boost || self.last_boost() == Some(boost)
    }

    /// Append a boost change observation
    pub fn record_boost_change(&mut self, boost: f64, valuation: Valuation, observed_at: DateTime<Utc>) {
        self.history.push(HistoryEntry {
            market_cap: valuation.market_cap,
            volume: valuation.volume,
            price: valuation.price,
            boost,
            timestamp: observed_at,
        });
    }

    /// Overwrite the current price and raise the watermark if exceeded.
    /// Returns true when a new high was set.
    pub fn update_price(&mut self, price: f64, observed_at: DateTime<Utc>) -> bool {
        self.current_price = PricePoint::new(price, observed_at);
        if price > self.highest_price.value {
            self.highest_price = self.current_price;
            return true;
        }
        false
    }

    /// Same watermark rule as `update_price`, for market cap
    pub fn update_market_cap(&mut self, market_cap: f64, observed_at: DateTime<Utc>) -> bool {
        self.current_market_cap = PricePoint::new(market_cap, observed_at);
        if market_cap > self.highest_market_cap.value {
            self.highest_market_cap = self.current_market_cap;
            return true;
        }
        false
    }

    /// Peak price relative to the detection price (1.0 = no gain)
    pub fn peak_multiple(&self) -> Option<f64> {
        if self.initial_price.value > 0.0 {
            Some(self.highest_price.value / self.initial_price.value)
        } else if self.initial_market_cap > 0.0 {
            Some(self.highest_market_cap.value / self.initial_market_cap)
        } else {
            None
        }
    }
}
