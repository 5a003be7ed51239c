//! Boost Tracker - DexScreener boost monitor library
//!
//! Tracks newly boosted Solana tokens and records how their price and market
//! cap move after the boost.
//!
//! # Modules
//!
//! - `domain`: Core state (TokenRecord, TokenLedger, ExclusionSet, snapshots)
//! - `ports`: Trait abstractions (BoostFeed, ValuationSource, PriceOracle, HolderSource)
//! - `adapters`: External implementations (DexScreener, Jupiter, Solana, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Reconciliation engine and poll loop

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
