//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The boost feed (DexScreener)
//! - Per-token valuation (DexScreener pairs)
//! - Batched price lookup (Jupiter)
//! - Holder concentration (Solana RPC)

pub mod market_data;
pub mod mocks;

pub use market_data::{BoostFeed, HolderSource, MarketDataError, PriceOracle, ValuationSource};
