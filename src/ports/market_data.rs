use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{BoostedToken, HolderConcentration, Valuation};

/// Market data error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("REST API error: {0}")]
    RestError(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("No data for {0}")]
    NoData(String),

    #[error("RPC error: {0}")]
    RpcError(String),
}

/// Source of currently boosted tokens
#[async_trait]
pub trait BoostFeed: Send + Sync {
    /// Latest boosted tokens for the configured chain, highest boost first
    async fn fetch_boosted(&self) -> Result<Vec<BoostedToken>, MarketDataError>;
}

/// Per-token market data (market cap, volume, price)
#[async_trait]
pub trait ValuationSource: Send + Sync {
    async fn fetch_valuation(&self, address: &str) -> Result<Valuation, MarketDataError>;
}

/// Batched price lookup
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Prices for as many of `addresses` as the oracle knows.
    /// Addresses without a usable price are absent from the map.
    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, MarketDataError>;
}

/// Top holder concentration for a mint
#[async_trait]
pub trait HolderSource: Send + Sync {
    async fn fetch_concentration(&self, mint: &str) -> Result<HolderConcentration, MarketDataError>;
}
