//! DexScreener Wire Types
//!
//! Every field is optional upstream; normalization fills in zeros and empty
//! strings so downstream code works on a fully populated `MarketPair`.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::domain::{BoostedToken, MarketPair, TokenRef};

/// Response of `/latest/dex/tokens/{address}`, `/latest/dex/pairs/..` and `/latest/dex/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<RawPair>>,
    #[serde(default)]
    pub pair: Option<RawPair>,
}

impl PairsResponse {
    /// All pairs in the body, `pair` first
    pub fn into_pairs(self) -> Vec<RawPair> {
        self.pair
            .into_iter()
            .chain(self.pairs.unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPair {
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub pair_address: Option<String>,
    pub base_token: Option<RawToken>,
    pub quote_token: Option<RawToken>,
    pub price_usd: Option<String>,
    pub txns: Option<RawTxns>,
    pub volume: Option<RawWindow>,
    pub price_change: Option<RawWindow>,
    pub liquidity: Option<RawLiquidity>,
    pub fdv: Option<f64>,
    /// Milliseconds since epoch
    pub pair_created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawToken {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTxns {
    pub h24: Option<RawTxnCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTxnCount {
    pub buys: Option<u64>,
    pub sells: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWindow {
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLiquidity {
    pub usd: Option<f64>,
}

/// Entry of `/token-boosts/top/v1`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoostedToken {
    pub chain_id: String,
    pub token_address: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub total_amount: Option<f64>,
}

impl From<RawToken> for TokenRef {
    fn from(raw: RawToken) -> Self {
        Self {
            address: raw.address.unwrap_or_default(),
            symbol: raw.symbol.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
        }
    }
}

impl From<RawPair> for MarketPair {
    fn from(raw: RawPair) -> Self {
        let (buys_24h, sells_24h) = raw
            .txns
            .and_then(|t| t.h24)
            .map(|h| (h.buys.unwrap_or(0), h.sells.unwrap_or(0)))
            .unwrap_or((0, 0));

        Self {
            chain_id: raw.chain_id.unwrap_or_default(),
            dex_id: raw.dex_id.unwrap_or_default(),
            pair_address: raw.pair_address.unwrap_or_default(),
            base_token: raw.base_token.unwrap_or_default().into(),
            quote_token: raw.quote_token.unwrap_or_default().into(),
            price_usd: raw.price_usd.as_deref().and_then(|p| Decimal::from_str(p).ok()),
            liquidity_usd: finite_or_zero(raw.liquidity.and_then(|l| l.usd)),
            volume_24h: finite_or_zero(raw.volume.and_then(|v| v.h24)),
            buys_24h,
            sells_24h,
            price_change_24h: finite_or_zero(raw.price_change.and_then(|p| p.h24)),
            fdv: raw.fdv.filter(|v| v.is_finite()),
            pair_created_at: raw.pair_created_at.and_then(millis_to_datetime),
            url: raw.url,
        }
    }
}

impl From<RawBoostedToken> for BoostedToken {
    fn from(raw: RawBoostedToken) -> Self {
        Self {
            chain_id: raw.chain_id,
            token_address: raw.token_address,
            description: raw.description,
            url: raw.url,
            total_amount: raw.total_amount,
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PAIR_JSON: &str = r#"{
        "chainId": "solana",
        "dexId": "raydium",
        "url": "https://dexscreener.com/solana/pool1",
        "pairAddress": "Pool1111",
        "baseToken": { "address": "BaseMint111", "name": "Bonk", "symbol": "BONK" },
        "quoteToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
        "priceNative": "0.0000001",
        "priceUsd": "0.00002451",
        "txns": { "m5": { "buys": 1, "sells": 2 }, "h24": { "buys": 700, "sells": 500 } },
        "volume": { "h24": 150000.5, "h6": 20000 },
        "priceChange": { "h24": -3.2 },
        "liquidity": { "usd": 250000.75, "base": 1, "quote": 2 },
        "fdv": 1500000,
        "pairCreatedAt": 1700000000000
    }"#;

    #[test]
    fn test_normalize_full_pair() {
        let raw: RawPair = serde_json::from_str(PAIR_JSON).unwrap();
        let pair = MarketPair::from(raw);

        assert_eq!(pair.chain_id, "solana");
        assert_eq!(pair.dex_id, "raydium");
        assert_eq!(pair.base_token.symbol, "BONK");
        assert_eq!(pair.quote_token.symbol, "SOL");
        assert_eq!(pair.price_usd, Some(dec!(0.00002451)));
        assert_eq!(pair.liquidity_usd, 250000.75);
        assert_eq!(pair.volume_24h, 150000.5);
        assert_eq!(pair.txns_24h(), 1200);
        assert_eq!(pair.price_change_24h, -3.2);
        assert_eq!(pair.fdv, Some(1_500_000.0));
        assert_eq!(
            pair.pair_created_at.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_normalize_sparse_pair() {
        let raw: RawPair = serde_json::from_str(r#"{ "chainId": "solana", "pairAddress": "P" }"#).unwrap();
        let pair = MarketPair::from(raw);

        assert_eq!(pair.liquidity_usd, 0.0);
        assert_eq!(pair.volume_24h, 0.0);
        assert_eq!(pair.txns_24h(), 0);
        assert!(pair.price_usd.is_none());
        assert!(pair.pair_created_at.is_none());
        assert_eq!(pair.base_token.address, "");
    }

    #[test]
    fn test_unparseable_price_is_dropped() {
        let raw: RawPair = serde_json::from_str(r#"{ "priceUsd": "n/a" }"#).unwrap();
        assert!(MarketPair::from(raw).price_usd.is_none());
    }

    #[test]
    fn test_pairs_response_variants() {
        let tokens: PairsResponse = serde_json::from_str(r#"{ "schemaVersion": "1.0.0", "pairs": null }"#).unwrap();
        assert!(tokens.into_pairs().is_empty());

        let single: PairsResponse =
            serde_json::from_str(&format!(r#"{{ "pairs": null, "pair": {} }}"#, PAIR_JSON)).unwrap();
        assert_eq!(single.into_pairs().len(), 1);
    }

    #[test]
    fn test_boosted_token() {
        let raw: Vec<RawBoostedToken> = serde_json::from_str(
            r#"[{ "url": "https://dexscreener.com/solana/x", "chainId": "solana", "tokenAddress": "Mint1", "amount": 100, "totalAmount": 500, "description": "gm" }]"#,
        )
        .unwrap();
        let token = BoostedToken::from(raw[0].clone());
        assert_eq!(token.token_address, "Mint1");
        assert_eq!(token.total_amount, Some(500.0));
    }
}
