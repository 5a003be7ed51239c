//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, load_or_default, Config, ConfigError, RefreshMode, RPC_ENV_VARS,
};
