//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: boost feed and per-token valuation
//! - Jupiter: batched price oracle
//! - Solana: RPC client and holder concentration
//! - CLI: Command-line interface definitions

pub mod dexscreener;
pub mod jupiter;
pub mod solana;
pub mod cli;

pub use dexscreener::DexScreenerClient;
pub use jupiter::JupiterPriceClient;
pub use solana::{HolderConcentrationClient, SolanaClient};
pub use cli::CliApp;
