//! Market Pair
//!
//! Normalized view of a DEX trading pair plus the best-pair selection rule
//! used when a token trades in several pools.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Chain identifier used by the market data API for Solana
pub const SOLANA_CHAIN_ID: &str = "solana";

/// Token side of a pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    pub address: String,
    pub symbol: String,
    pub name: String,
}

/// A single trading pair, normalized from the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPair {
    /// Chain the pair lives on (e.g. "solana")
    pub chain_id: String,
    /// DEX the pool belongs to (e.g. "raydium")
    pub dex_id: String,
    /// Pool address
    pub pair_address: String,
    pub base_token: TokenRef,
    pub quote_token: TokenRef,
    /// Price of the base token in USD
    pub price_usd: Option<Decimal>,
    /// Pool liquidity in USD
    pub liquidity_usd: f64,
    /// 24h traded volume in USD
    pub volume_24h: f64,
    /// 24h buy transactions
    pub buys_24h: u64,
    /// 24h sell transactions
    pub sells_24h: u64,
    /// 24h price change in percent
    pub price_change_24h: f64,
    /// Fully diluted valuation in USD
    pub fdv: Option<f64>,
    /// Pool creation time
    pub pair_created_at: Option<DateTime<Utc>>,
    /// Link to the pair page
    pub url: Option<String>,
}

impl MarketPair {
    /// Total 24h transactions (buys + sells)
    pub fn txns_24h(&self) -> u64 {
        self.buys_24h.saturating_add(self.sells_24h)
    }

    /// The pair side whose mint is `address`, if either
    pub fn token(&self, address: &str) -> Option<&TokenRef> {
        [&self.base_token, &self.quote_token]
            .into_iter()
            .find(|t| t.address == address)
    }

    /// Pool age in hours relative to `now`, if the creation time is known
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<i64> {
        self.pair_created_at
            .map(|created| (now - created).num_hours().max(0))
    }

    /// Buy share of 24h transactions in percent (50.0 when there were none)
    pub fn buy_pressure_pct(&self) -> f64 {
        let total = self.txns_24h();
        if total == 0 {
            return 50.0;
        }
        self.buys_24h as f64 / total as f64 * 100.0
    }
}

/// A token promoted on the market data API's boost board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedToken {
    pub chain_id: String,
    pub token_address: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub total_amount: Option<f64>,
}

/// Pick the pair with the greatest USD liquidity on `chain_id`.
///
/// Ties keep the first pair in input order. Returns `None` when no pair
/// belongs to the chain.
pub fn select_best_pair(pairs: Vec<MarketPair>, chain_id: &str) -> Option<MarketPair> {
    let mut best: Option<MarketPair> = None;

    for pair in pairs.into_iter().filter(|p| p.chain_id == chain_id) {
        let replace = match &best {
            Some(current) => pair.liquidity_usd > current.liquidity_usd,
            None => true,
        };
        if replace {
            best = Some(pair);
        }
    }

    best
}

/// Keep pairs on `chain_id`, sorted by liquidity (highest first, stable)
pub fn rank_pairs_by_liquidity(pairs: Vec<MarketPair>, chain_id: &str) -> Vec<MarketPair> {
    let mut ranked: Vec<MarketPair> = pairs
        .into_iter()
        .filter(|p| p.chain_id == chain_id)
        .collect();
    ranked.sort_by(|a, b| b.liquidity_usd.total_cmp(&a.liquidity_usd));
    ranked
}
