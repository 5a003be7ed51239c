//! DexScreener Adapter
//!
//! Boost feed and per-token valuation:
//! - `/token-boosts/latest/v1` for boosted tokens (filtered to one chain)
//! - `/latest/dex/tokens/{address}` for fdv, 24h volume and price

mod client;
mod types;

pub use client::{
    parse_boosts, parse_valuation, DexScreenerClient, DexScreenerConfig, DexScreenerError,
    DEFAULT_CHAIN_ID, DEXSCREENER_BASE_URL,
};
pub use types::{PairData, TokenBoost, TokenPairsResponse};
