//! DexScreener API wire types

use serde::Deserialize;

use crate::domain::{BoostedToken, Valuation};

/// Item of `/token-boosts/latest/v1`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBoost {
    #[serde(default)]
    pub url: String,
    pub chain_id: String,
    pub token_address: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub description: Option<String>,
}

impl TokenBoost {
    pub fn into_boosted(self) -> BoostedToken {
        BoostedToken {
            address: self.token_address,
            url: self.url,
            boost: self.total_amount.or(self.amount).unwrap_or(0.0),
        }
    }
}

/// Response of `/latest/dex/tokens/{address}`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<PairData>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairData {
    #[serde(default)]
    #[allow(dead_code)]
    pub pair_address: Option<String>,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub volume: Option<VolumeData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeData {
    #[serde(default)]
    pub h24: Option<f64>,
}

impl PairData {
    /// Fully diluted valuation, falling back to market cap when fdv is absent
    pub fn to_valuation(&self) -> Option<Valuation> {
        let market_cap = self.fdv.or(self.market_cap)?;
        let price = self.price_usd.as_deref()?.trim().parse::<f64>().ok()?;
        let volume = self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0);
        Some(Valuation::new(market_cap, volume, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boost_item() {
        let json = r#"{
            "url": "https://dexscreener.com/solana/abc",
            "chainId": "solana",
            "tokenAddress": "AbcMint",
            "icon": "x",
            "description": "meme",
            "links": [{"type": "twitter", "label": "x", "url": "https://x.com"}],
            "totalAmount": 500,
            "amount": 100
        }"#;

        let boost: TokenBoost = serde_json::from_str(json).unwrap();
        let token = boost.into_boosted();
        assert_eq!(token.address, "AbcMint");
        assert_eq!(token.boost, 500.0);
    }

    #[test]
    fn test_boost_item_without_url_is_kept() {
        let json = r#"{"chainId": "solana", "tokenAddress": "NoUrlMint", "totalAmount": 50}"#;

        let token = serde_json::from_str::<TokenBoost>(json).unwrap().into_boosted();
        assert_eq!(token.address, "NoUrlMint");
        assert!(token.url.is_empty());
        assert_eq!(token.boost, 50.0);
    }

    #[test]
    fn test_parse_pair_valuation() {
        let json = r#"{
            "schemaVersion": "1.0.0",
            "pairs": [
                {
                    "pairAddress": "Pair1",
                    "priceUsd": "0.0004512",
                    "fdv": 451200,
                    "marketCap": 451200,
                    "volume": {"h24": 123456.7, "h6": 1000}
                },
                {"pairAddress": "Pair2", "priceUsd": "1", "fdv": 1}
            ]
        }"#;

        let response: TokenPairsResponse = serde_json::from_str(json).unwrap();
        let valuation = response.pairs.unwrap()[0].to_valuation().unwrap();
        assert_eq!(valuation.market_cap, 451_200.0);
        assert_eq!(valuation.volume, 123_456.7);
        assert_eq!(valuation.price, 0.0004512);
    }

    #[test]
    fn test_pair_without_price_is_rejected() {
        let json = r#"{"pairs": [{"fdv": 100000}]}"#;
        let response: TokenPairsResponse = serde_json::from_str(json).unwrap();
        assert!(response.pairs.unwrap()[0].to_valuation().is_none());
    }

    #[test]
    fn test_null_pairs() {
        let response: TokenPairsResponse = serde_json::from_str(r#"{"pairs": null}"#).unwrap();
        assert!(response.pairs.is_none());
    }
}
