pub mod rpc;
pub mod holders;

pub use rpc::{parse_commitment, SolanaClient, SolanaClientError, TokenAccountBalance};
pub use holders::{compute_concentration, HolderConcentrationClient, RAYDIUM_AUTHORITY_V4};
