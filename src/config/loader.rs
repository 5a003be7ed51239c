//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/tracker.toml.
//! Every section falls back to defaults, so an empty file is valid apart
//! from the RPC endpoint, which must come from the file, the environment or
//! the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::adapters::dexscreener::{DEFAULT_CHAIN_ID, DEXSCREENER_BASE_URL};
use crate::adapters::jupiter::{JUPITER_PRICE_API, MAX_IDS_PER_REQUEST};
use crate::domain::{DEFAULT_LEDGER_CAPACITY, DEFAULT_MARKET_CAP_CEILING};

/// Environment variables checked for the RPC endpoint, in order
pub const RPC_ENV_VARS: &[&str] = &["RPC", "SOLANA_RPC_URL"];

/// Main configuration structure matching config/tracker.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub valuation: ValuationSection,
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub tracker: TrackerSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Boost feed section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedSection {
    /// DexScreener API base URL
    #[serde(default = "default_dexscreener_url")]
    pub api_url: String,
    /// Only boosts on this chain are tracked
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Valuation and exclusion policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValuationSection {
    /// Tokens above this market cap (USD) are excluded for good
    #[serde(default = "default_market_cap_ceiling")]
    pub market_cap_ceiling: f64,
}

/// Batch price oracle section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleSection {
    /// Jupiter price API URL
    #[serde(default = "default_price_api_url")]
    pub api_url: String,
    /// Ids per request (1-100)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Delay between batches in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolanaSection {
    /// RPC endpoint used for holder data
    #[serde(default)]
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

impl SolanaSection {
    /// RPC URL with environment variable override.
    /// Checks RPC, then SOLANA_RPC_URL, falls back to the config value.
    pub fn get_rpc_url(&self) -> String {
        self.rpc_url_with(|var| std::env::var(var).ok())
    }

    /// Same precedence as `get_rpc_url`, reading variables through `lookup`
    pub fn rpc_url_with(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        RPC_ENV_VARS
            .iter()
            .filter_map(|var| lookup(*var))
            .find(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.rpc_url.clone())
    }
}

/// How tracked valuations are refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshMode {
    /// Batch price oracle, price watermark only
    #[default]
    Price,
    /// Per-token valuation, market cap and price watermarks plus ceiling check
    MarketCap,
}

impl FromStr for RefreshMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" => Ok(RefreshMode::Price),
            "market-cap" | "market_cap" | "marketcap" => Ok(RefreshMode::MarketCap),
            other => Err(ConfigError::ValidationError(format!(
                "unknown refresh mode '{}', expected 'price' or 'market-cap'",
                other
            ))),
        }
    }
}

/// Poll loop section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerSection {
    /// Maximum number of tracked tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Refresh valuations and snapshot every N cycles
    #[serde(default = "default_refresh_every")]
    pub refresh_every_cycles: u32,
    /// Sleep between cycles in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub refresh_mode: RefreshMode,
}

/// Snapshot output section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSection {
    /// Root directory for run folders (supports ~)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl OutputSection {
    /// Data directory with ~ expanded
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).to_string())
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_dexscreener_url() -> String { DEXSCREENER_BASE_URL.to_string() }
fn default_chain_id() -> String { DEFAULT_CHAIN_ID.to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_market_cap_ceiling() -> f64 { DEFAULT_MARKET_CAP_CEILING }
fn default_price_api_url() -> String { JUPITER_PRICE_API.to_string() }
fn default_batch_size() -> usize { MAX_IDS_PER_REQUEST }
fn default_batch_delay_ms() -> u64 { 1000 }
fn default_commitment() -> String { "finalized".to_string() }
fn default_max_tokens() -> usize { DEFAULT_LEDGER_CAPACITY }
fn default_refresh_every() -> u32 { 20 }
fn default_poll_interval_secs() -> u64 { 5 }
fn default_data_dir() -> String { "data".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            api_url: default_dexscreener_url(),
            chain_id: default_chain_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            commitment: default_commitment(),
        }
    }
}

impl Default for ValuationSection {
    fn default() -> Self {
        Self { market_cap_ceiling: default_market_cap_ceiling() }
    }
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            api_url: default_price_api_url(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            refresh_every_cycles: default_refresh_every(),
            poll_interval_secs: default_poll_interval_secs(),
            refresh_mode: RefreshMode::default(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("RPC endpoint not set (config solana.rpc_url, RPC or SOLANA_RPC_URL)")]
    MissingRpcUrl,
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load from `path` when it exists, otherwise start from defaults.
/// Runs before logging is set up, so callers report a missing file.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.api_url cannot be empty".to_string(),
            ));
        }

        if self.feed.chain_id.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.chain_id cannot be empty".to_string(),
            ));
        }

        let ceiling = self.valuation.market_cap_ceiling;
        if !ceiling.is_finite() || ceiling <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "market_cap_ceiling must be > 0, got {}",
                self.valuation.market_cap_ceiling
            )));
        }

        if self.oracle.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "oracle.api_url cannot be empty".to_string(),
            ));
        }

        if self.oracle.batch_size == 0 || self.oracle.batch_size > MAX_IDS_PER_REQUEST {
            return Err(ConfigError::ValidationError(format!(
                "batch_size must be 1-{}, got {}",
                MAX_IDS_PER_REQUEST, self.oracle.batch_size
            )));
        }

        if crate::adapters::solana::parse_commitment(&self.solana.commitment).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "unknown commitment level '{}'",
                self.solana.commitment
            )));
        }

        if self.tracker.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be > 0".to_string(),
            ));
        }

        if self.tracker.refresh_every_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "refresh_every_cycles must be > 0".to_string(),
            ));
        }

        if self.output.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Effective RPC URL, failing when none is configured anywhere
    pub fn require_rpc_url(&self) -> Result<String, ConfigError> {
        self.require_rpc_url_with(|var| std::env::var(var).ok())
    }

    /// `require_rpc_url` with environment lookups routed through `lookup`
    pub fn require_rpc_url_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        let url = self.solana.rpc_url_with(lookup);
        if url.trim().is_empty() {
            return Err(ConfigError::MissingRpcUrl);
        }
        Ok(url)
    }
}
