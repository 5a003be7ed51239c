//! Jupiter Adapter
//!
//! Batched price oracle backed by the Jupiter price API.

mod price;

pub use price::{JupiterPriceClient, JupiterPriceConfig, PriceError, JUPITER_PRICE_API, MAX_IDS_PER_REQUEST};
