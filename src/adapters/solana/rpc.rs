use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// SPL Token program
pub const SPL_TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Size of an SPL token account
pub const TOKEN_ACCOUNT_LEN: usize = 165;

const MINT_OFFSET: usize = 0;
const OWNER_OFFSET: usize = 32;
const AMOUNT_OFFSET: usize = 64;

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid commitment level: {0}")]
    InvalidCommitment(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Owner and raw balance of one token account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountBalance {
    pub owner: String,
    pub amount: u64,
}

/// Parse "processed" / "confirmed" / "finalized"
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig, SolanaClientError> {
    match level.to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(SolanaClientError::InvalidCommitment(other.to_string())),
    }
}

/// Decode owner (bytes 32..64) and little-endian amount (bytes 64..72) of an SPL token account
pub fn decode_token_account(data: &[u8]) -> Option<TokenAccountBalance> {
    if data.len() < AMOUNT_OFFSET + 8 {
        return None;
    }
    let owner = bs58::encode(&data[OWNER_OFFSET..AMOUNT_OFFSET]).into_string();
    let amount_bytes: [u8; 8] = data[AMOUNT_OFFSET..AMOUNT_OFFSET + 8].try_into().ok()?;
    Some(TokenAccountBalance {
        owner,
        amount: u64::from_le_bytes(amount_bytes),
    })
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    /// Create a new Solana RPC client
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, commitment));
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Total supply of a mint in base units
    pub async fn get_token_supply(&self, mint: &str) -> Result<u64, SolanaClientError> {
        let pubkey = parse_pubkey(mint)?;

        // Spawn blocking to make sync RPC call async-compatible
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_token_supply(&pubkey)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
                .and_then(|supply| {
                    supply
                        .amount
                        .parse::<u64>()
                        .map_err(|e| SolanaClientError::ParseError(e.to_string()))
                })
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }

    /// Every SPL token account holding `mint`, decoded to owner + amount
    pub async fn get_token_accounts_for_mint(
        &self,
        mint: &str,
    ) -> Result<Vec<TokenAccountBalance>, SolanaClientError> {
        let mint_key = parse_pubkey(mint)?;
        let program_id = parse_pubkey(SPL_TOKEN_PROGRAM_ID)?;

        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::DataSize(TOKEN_ACCOUNT_LEN as u64),
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(MINT_OFFSET, &mint_key.to_bytes())),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..Default::default()
            },
            ..Default::default()
        };

        let client = Arc::clone(&self.client);
        let accounts = tokio::task::spawn_blocking(move || {
            client
                .get_program_accounts_with_config(&program_id, config)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))??;

        Ok(accounts
            .iter()
            .filter_map(|(_, account)| decode_token_account(&account.data))
            .collect())
    }
}

fn parse_pubkey(value: &str) -> Result<Pubkey, SolanaClientError> {
    Pubkey::from_str(value).map_err(|e| SolanaClientError::InvalidPublicKey(format!("{}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_bytes(owner: &[u8; 32], amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
        data[OWNER_OFFSET..AMOUNT_OFFSET].copy_from_slice(owner);
        data[AMOUNT_OFFSET..AMOUNT_OFFSET + 8].copy_from_slice(&amount.to_le_bytes());
        data
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = SolanaClient::new(
            "https://api.devnet.solana.com".to_string(),
            CommitmentConfig::finalized(),
        );
        assert_eq!(client.url(), "https://api.devnet.solana.com");
    }

    #[test]
    fn test_decode_token_account() {
        let owner = [7u8; 32];
        let data = account_bytes(&owner, 1_234_567_890);

        let decoded = decode_token_account(&data).unwrap();
        assert_eq!(decoded.amount, 1_234_567_890);
        assert_eq!(decoded.owner, bs58::encode(owner).into_string());
    }

    #[test]
    fn test_decode_short_account() {
        assert!(decode_token_account(&[0u8; 40]).is_none());
    }

    #[test]
    fn test_parse_commitment() {
        assert_eq!(parse_commitment("finalized").unwrap(), CommitmentConfig::finalized());
        assert_eq!(parse_commitment("Confirmed").unwrap(), CommitmentConfig::confirmed());
        assert!(parse_commitment("fast").is_err());
    }

    #[tokio::test]
    async fn test_invalid_mint_rejected() {
        let client = SolanaClient::new("http://127.0.0.1:1".to_string(), CommitmentConfig::confirmed());
        let result = client.get_token_supply("not-a-pubkey").await;
        assert!(matches!(result, Err(SolanaClientError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_error_display() {
        let err = SolanaClientError::RpcError("test".to_string());
        assert!(err.to_string().contains("RPC request failed"));
    }
}
