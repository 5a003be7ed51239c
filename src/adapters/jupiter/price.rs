//! Jupiter Price Client
//!
//! Batched USD price lookup. Jupiter accepts at most 100 ids per request, so
//! larger sets are paged with a fixed delay between pages to stay inside the
//! free tier rate limit.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::ports::{MarketDataError, PriceOracle};

pub const JUPITER_PRICE_API: &str = "https://api.jup.ag/price/v2";

/// Jupiter API limit on ids per request
pub const MAX_IDS_PER_REQUEST: usize = 100;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Price API returned status {0}")]
    StatusError(u16),
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<PriceError> for MarketDataError {
    fn from(err: PriceError) -> Self {
        match err {
            PriceError::HttpError(e) => MarketDataError::RestError(e.to_string()),
            PriceError::StatusError(code) => MarketDataError::RestError(format!("HTTP {}", code)),
            PriceError::ParseError(msg) => MarketDataError::ParseError(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JupiterPriceConfig {
    pub api_url: String,
    /// Ids per request (1..=100)
    pub batch_size: usize,
    /// Pause between consecutive requests of one lookup
    pub batch_delay: Duration,
    pub timeout: Duration,
}

impl Default for JupiterPriceConfig {
    fn default() -> Self {
        Self {
            api_url: JUPITER_PRICE_API.to_string(),
            batch_size: MAX_IDS_PER_REQUEST,
            batch_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JupiterPriceClient {
    config: JupiterPriceConfig,
    http: Client,
}

impl JupiterPriceClient {
    pub fn new() -> Result<Self, PriceError> {
        Self::with_config(JupiterPriceConfig::default())
    }

    pub fn with_config(mut config: JupiterPriceConfig) -> Result<Self, PriceError> {
        config.batch_size = config.batch_size.clamp(1, MAX_IDS_PER_REQUEST);
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &JupiterPriceConfig {
        &self.config
    }

    /// One request for at most `batch_size` ids
    async fn get_batch(&self, mints: &[String]) -> Result<HashMap<String, f64>, PriceError> {
        let url = format!("{}?ids={}", self.config.api_url, mints.join(","));
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(PriceError::StatusError(response.status().as_u16()));
        }

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| PriceError::ParseError(e.to_string()))?;

        Ok(body.into_prices())
    }

    /// Prices for all `mints`, paged by `batch_size` with `batch_delay` between pages.
    pub async fn get_batch_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, PriceError> {
        fetch_paged(mints, self.config.batch_size, self.config.batch_delay, |chunk| async move {
            self.get_batch(&chunk).await
        })
        .await
    }
}

/// Pages `ids` through `fetch`, sleeping `delay` between pages.
/// A failed page is logged and skipped; the call fails only if every page failed.
async fn fetch_paged<F, Fut>(
    ids: &[String],
    batch_size: usize,
    delay: Duration,
    mut fetch: F,
) -> Result<HashMap<String, f64>, PriceError>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<HashMap<String, f64>, PriceError>>,
{
    let mut result = HashMap::new();
    if ids.is_empty() {
        return Ok(result);
    }

    let mut last_error = None;
    let mut any_ok = false;

    for (i, chunk) in ids.chunks(batch_size.max(1)).enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match fetch(chunk.to_vec()).await {
            Ok(prices) => {
                any_ok = true;
                result.extend(prices);
            }
            Err(e) => {
                tracing::warn!("Price batch {} ({} ids) failed: {}", i + 1, chunk.len(), e);
                last_error = Some(e);
            }
        }
    }

    match (any_ok, last_error) {
        (false, Some(e)) => Err(e),
        _ => Ok(result),
    }
}

#[async_trait]
impl PriceOracle for JupiterPriceClient {
    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, MarketDataError> {
        Ok(self.get_batch_prices(addresses).await?)
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    data: HashMap<String, Option<PriceData>>,
    #[serde(rename = "timeTaken")]
    #[allow(dead_code)]
    time_taken: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    #[allow(dead_code)]
    id: Option<String>,
    price: Option<String>,
}

impl PriceResponse {
    /// Parsed, positive prices only
    fn into_prices(self) -> HashMap<String, f64> {
        self.data
            .into_iter()
            .filter_map(|(mint, data)| {
                let raw = data?.price?;
                match raw.trim().parse::<f64>() {
                    Ok(price) if price.is_finite() && price > 0.0 => Some((mint, price)),
                    _ => {
                        tracing::debug!("Unusable price for {}: {:?}", mint, raw);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[test]
    fn test_client_creation() {
        let client = JupiterPriceClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_batch_size_clamped() {
        let client = JupiterPriceClient::with_config(JupiterPriceConfig {
            batch_size: 500,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.config().batch_size, MAX_IDS_PER_REQUEST);

        let client = JupiterPriceClient::with_config(JupiterPriceConfig {
            batch_size: 0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.config().batch_size, 1);
    }

    #[test]
    fn test_parse_price_response() {
        let json = r#"{
            "data": {
                "MintA": {"id": "MintA", "type": "derivedPrice", "price": "0.0012"},
                "MintB": null,
                "MintC": {"id": "MintC", "price": "not-a-number"},
                "MintD": {"id": "MintD", "price": "0"}
            },
            "timeTaken": 0.004
        }"#;

        let response: PriceResponse = serde_json::from_str(json).unwrap();
        let prices = response.into_prices();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices["MintA"], 0.0012);
    }

    #[tokio::test]
    async fn test_get_batch_prices_empty() {
        let client = JupiterPriceClient::new().unwrap();
        let result = client.get_batch_prices(&[]).await;
        assert!(result.unwrap().is_empty());
    }

    fn mints(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("m{}", i)).collect()
    }

    /// Fake page fetch: prices every id at 1.0 unless the page index is in `failing`
    fn recording_fetch(
        calls: &Arc<Mutex<Vec<(usize, Instant)>>>,
        failing: &'static [usize],
    ) -> impl FnMut(Vec<String>) -> std::future::Ready<Result<HashMap<String, f64>, PriceError>> {
        let calls = calls.clone();
        move |chunk| {
            let mut calls = calls.lock().unwrap();
            let page = calls.len();
            calls.push((chunk.len(), Instant::now()));
            if failing.contains(&page) {
                std::future::ready(Err(PriceError::StatusError(500)))
            } else {
                std::future::ready(Ok(chunk.into_iter().map(|id| (id, 1.0)).collect()))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_sizes_and_delay() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let delay = Duration::from_millis(1000);

        let prices = fetch_paged(&mints(250), 100, delay, recording_fetch(&calls, &[]))
            .await
            .unwrap();

        assert_eq!(prices.len(), 250);
        let calls = calls.lock().unwrap();
        let sizes: Vec<usize> = calls.iter().map(|(n, _)| *n).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(calls[1].1 - calls[0].1, delay);
        assert_eq!(calls[2].1 - calls[1].1, delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_page_drops_only_its_ids() {
        let calls = Arc::new(Mutex::new(Vec::new()));

        let prices = fetch_paged(&mints(250), 100, Duration::from_millis(1000), recording_fetch(&calls, &[1]))
            .await
            .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 3);
        assert_eq!(prices.len(), 150);
        assert!(prices.contains_key("m0"));
        assert!(prices.contains_key("m249"));
        assert!((100..200).all(|i| !prices.contains_key(&format!("m{}", i))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_page_failing_is_an_error() {
        let calls = Arc::new(Mutex::new(Vec::new()));

        let result = fetch_paged(&mints(250), 100, Duration::from_millis(1000), recording_fetch(&calls, &[0, 1, 2]))
            .await;

        assert!(matches!(result, Err(PriceError::StatusError(500))));
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_error_display() {
        let err = PriceError::ParseError("bad body".into());
        assert!(err.to_string().contains("bad body"));

        let err: MarketDataError = PriceError::StatusError(429).into();
        assert!(err.to_string().contains("429"));
    }
}
