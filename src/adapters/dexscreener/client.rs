//! DexScreener Client
//!
//! Fetches the latest boosted tokens and per-token pair data.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::types::{TokenBoost, TokenPairsResponse};
use crate::domain::{BoostedToken, Valuation};
use crate::ports::{BoostFeed, MarketDataError, ValuationSource};

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";
pub const DEFAULT_CHAIN_ID: &str = "solana";
const BOOSTS_LATEST_PATH: &str = "token-boosts/latest/v1";
const TOKEN_PAIRS_PATH: &str = "latest/dex/tokens";

#[derive(Debug, Error)]
pub enum DexScreenerError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No pairs for token: {0}")]
    NoPairs(String),
}

impl From<DexScreenerError> for MarketDataError {
    fn from(err: DexScreenerError) -> Self {
        match err {
            DexScreenerError::HttpError(e) => MarketDataError::RestError(e.to_string()),
            DexScreenerError::ApiError { status, body } => {
                MarketDataError::RestError(format!("HTTP {}: {}", status, body))
            }
            DexScreenerError::InvalidResponse(msg) => MarketDataError::ParseError(msg),
            DexScreenerError::NoPairs(token) => MarketDataError::NoData(token),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub base_url: String,
    pub chain_id: String,
    pub timeout: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEXSCREENER_BASE_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerClient {
    pub fn new() -> Result<Self, DexScreenerError> {
        Self::with_config(DexScreenerConfig::default())
    }

    pub fn with_config(config: DexScreenerConfig) -> Result<Self, DexScreenerError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &DexScreenerConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str) -> Result<Value, DexScreenerError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DexScreenerError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Latest boosted tokens on the configured chain, highest boost first
    pub async fn get_latest_boosts(&self) -> Result<Vec<BoostedToken>, DexScreenerError> {
        let body = self.get_json(&self.url(BOOSTS_LATEST_PATH)).await?;
        parse_boosts(body, &self.config.chain_id)
    }

    /// Valuation from the first pair listed for `address`
    pub async fn get_valuation(&self, address: &str) -> Result<Valuation, DexScreenerError> {
        let url = self.url(&format!("{}/{}", TOKEN_PAIRS_PATH, address));
        let body = self.get_json(&url).await?;
        parse_valuation(body, address)
    }
}

/// Filter a raw boost payload to `chain_id` and sort by boost, descending
pub fn parse_boosts(body: Value, chain_id: &str) -> Result<Vec<BoostedToken>, DexScreenerError> {
    let Value::Array(items) = body else {
        return Err(DexScreenerError::InvalidResponse(
            "boost feed is not an array".to_string(),
        ));
    };

    let mut tokens: Vec<BoostedToken> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<TokenBoost>(item) {
            Ok(boost) => Some(boost),
            Err(e) => {
                tracing::debug!("Skipping malformed boost item: {}", e);
                None
            }
        })
        .filter(|b| b.chain_id == chain_id)
        .map(TokenBoost::into_boosted)
        .collect();

    tokens.sort_by(|a, b| b.boost.partial_cmp(&a.boost).unwrap_or(std::cmp::Ordering::Equal));
    Ok(tokens)
}

pub fn parse_valuation(body: Value, address: &str) -> Result<Valuation, DexScreenerError> {
    let response: TokenPairsResponse = serde_json::from_value(body)
        .map_err(|e| DexScreenerError::InvalidResponse(e.to_string()))?;

    let pair = response
        .pairs
        .and_then(|pairs| pairs.into_iter().next())
        .ok_or_else(|| DexScreenerError::NoPairs(address.to_string()))?;

    pair.to_valuation().ok_or_else(|| {
        DexScreenerError::InvalidResponse(format!("pair for {} lacks fdv or price", address))
    })
}

#[async_trait]
impl BoostFeed for DexScreenerClient {
    async fn fetch_boosted(&self) -> Result<Vec<BoostedToken>, MarketDataError> {
        Ok(self.get_latest_boosts().await?)
    }
}

#[async_trait]
impl ValuationSource for DexScreenerClient {
    async fn fetch_valuation(&self, address: &str) -> Result<Valuation, MarketDataError> {
        Ok(self.get_valuation(address).await?)
    }
}
