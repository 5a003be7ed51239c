//! In-memory port implementations that record calls and return scripted responses

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::market_data::{BoostFeed, HolderSource, MarketDataError, PriceOracle, ValuationSource};
use crate::domain::{BoostedToken, HolderConcentration, Valuation};

/// Feed that plays back queued batches, then returns empty lists
#[derive(Debug, Clone, Default)]
pub struct MockBoostFeed {
    batches: Arc<Mutex<VecDeque<Result<Vec<BoostedToken>, MarketDataError>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockBoostFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to queue a batch
    pub fn with_batch(self, batch: Vec<BoostedToken>) -> Self {
        self.push_batch(batch);
        self
    }

    pub fn push_batch(&self, batch: Vec<BoostedToken>) {
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_error(&self, error: MarketDataError) {
        self.batches.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BoostFeed for MockBoostFeed {
    async fn fetch_boosted(&self) -> Result<Vec<BoostedToken>, MarketDataError> {
        *self.calls.lock().unwrap() += 1;
        self.batches.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Valuation source with a settable valuation per address
#[derive(Debug, Clone, Default)]
pub struct MockValuationSource {
    valuations: Arc<Mutex<HashMap<String, Valuation>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockValuationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a valuation for an address
    pub fn with_valuation(self, address: &str, valuation: Valuation) -> Self {
        self.set(address, valuation);
        self
    }

    pub fn set(&self, address: &str, valuation: Valuation) {
        self.valuations.lock().unwrap().insert(address.to_string(), valuation);
    }

    pub fn set_market_cap(&self, address: &str, market_cap: f64) {
        self.set(address, Valuation::new(market_cap, 10_000.0, market_cap / 1_000_000_000.0));
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, address: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|a| *a == address).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl ValuationSource for MockValuationSource {
    async fn fetch_valuation(&self, address: &str) -> Result<Valuation, MarketDataError> {
        self.calls.lock().unwrap().push(address.to_string());
        self.valuations
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .ok_or_else(|| MarketDataError::NoData(address.to_string()))
    }
}

/// Price oracle with a settable price per address
#[derive(Debug, Clone, Default)]
pub struct MockPriceOracle {
    prices: Arc<Mutex<HashMap<String, f64>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, address: &str, price: f64) -> Self {
        self.set(address, price);
        self
    }

    pub fn set(&self, address: &str, price: f64) {
        self.prices.lock().unwrap().insert(address.to_string(), price);
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Address lists passed to each call
    pub fn get_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceOracle for MockPriceOracle {
    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, MarketDataError> {
        let mut requested = addresses.to_vec();
        requested.sort();
        self.calls.lock().unwrap().push(requested);

        if *self.fail.lock().unwrap() {
            return Err(MarketDataError::RestError("oracle unavailable".to_string()));
        }

        let prices = self.prices.lock().unwrap();
        Ok(addresses
            .iter()
            .filter_map(|a| prices.get(a).map(|p| (a.clone(), *p)))
            .collect())
    }
}

/// Holder source returning a fixed concentration, or failing
#[derive(Debug, Clone)]
pub struct MockHolderSource {
    result: Arc<Mutex<Result<HolderConcentration, MarketDataError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockHolderSource {
    pub fn new(concentration: HolderConcentration) -> Self {
        Self {
            result: Arc::new(Mutex::new(Ok(concentration))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Arc::new(Mutex::new(Err(MarketDataError::RpcError("rpc down".to_string())))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockHolderSource {
    fn default() -> Self {
        Self::new(HolderConcentration::Available {
            top10_pct: 30.0,
            top25_pct: 45.0,
            top50_pct: 60.0,
            holders_sampled: 500,
        })
    }
}

#[async_trait]
impl HolderSource for MockHolderSource {
    async fn fetch_concentration(&self, mint: &str) -> Result<HolderConcentration, MarketDataError> {
        self.calls.lock().unwrap().push(mint.to_string());
        self.result.lock().unwrap().clone()
    }
}
