//! Holder Concentration
//!
//! Ranks the token accounts of a mint by balance and reports the share of
//! supply held by the top 10, 25 and 50 accounts. The Raydium AMM authority
//! holds pool liquidity rather than a position, so its accounts are left out
//! of the ranking.

use async_trait::async_trait;

use super::rpc::{SolanaClient, SolanaClientError, TokenAccountBalance};
use crate::domain::HolderConcentration;
use crate::ports::{HolderSource, MarketDataError};

/// Raydium AMM v4 authority
pub const RAYDIUM_AUTHORITY_V4: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

/// Owners never counted as holders
pub const EXCLUDED_OWNERS: &[&str] = &[RAYDIUM_AUTHORITY_V4];

impl From<SolanaClientError> for MarketDataError {
    fn from(err: SolanaClientError) -> Self {
        match err {
            SolanaClientError::ParseError(msg) => MarketDataError::ParseError(msg),
            other => MarketDataError::RpcError(other.to_string()),
        }
    }
}

/// Supply share of the largest holders. `None` when supply is zero.
pub fn compute_concentration(supply: u64, accounts: &[TokenAccountBalance]) -> Option<HolderConcentration> {
    if supply == 0 {
        return None;
    }

    let mut amounts: Vec<u64> = accounts
        .iter()
        .filter(|a| a.amount > 0 && !EXCLUDED_OWNERS.contains(&a.owner.as_str()))
        .map(|a| a.amount)
        .collect();
    amounts.sort_unstable_by(|a, b| b.cmp(a));

    let pct_of_top = |n: usize| -> f64 {
        let held: u128 = amounts.iter().take(n).map(|&a| a as u128).sum();
        held as f64 / supply as f64 * 100.0
    };

    Some(HolderConcentration::Available {
        top10_pct: pct_of_top(10),
        top25_pct: pct_of_top(25),
        top50_pct: pct_of_top(50),
        holders_sampled: amounts.len(),
    })
}

/// `HolderSource` backed by Solana RPC
#[derive(Clone)]
pub struct HolderConcentrationClient {
    rpc: SolanaClient,
}

impl HolderConcentrationClient {
    pub fn new(rpc: SolanaClient) -> Self {
        Self { rpc }
    }

    pub async fn analyze(&self, mint: &str) -> Result<HolderConcentration, MarketDataError> {
        let supply = self.rpc.get_token_supply(mint).await?;
        let accounts = self.rpc.get_token_accounts_for_mint(mint).await?;

        tracing::debug!("{}: {} token accounts, supply {}", mint, accounts.len(), supply);

        compute_concentration(supply, &accounts)
            .ok_or_else(|| MarketDataError::NoData(format!("{} has zero supply", mint)))
    }
}

#[async_trait]
impl HolderSource for HolderConcentrationClient {
    async fn fetch_concentration(&self, mint: &str) -> Result<HolderConcentration, MarketDataError> {
        self.analyze(mint).await
    }
}
