//! DexScreener Client
//!
//! Market data for Solana tokens: best pair by liquidity, pair lookup,
//! search and the boost board. Every request goes through the shared
//! rate-limited fetcher.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::adapters::fetch::{message_indicates_rate_limit, RateLimitSignal, RateLimitedFetcher};
use crate::domain::{
    rank_pairs_by_liquidity, select_best_pair, AnalysisError, BoostedToken, MarketPair,
    SOLANA_CHAIN_ID,
};
use crate::ports::MarketDataPort;
use super::types::{PairsResponse, RawBoostedToken};

pub const DEFAULT_API_URL: &str = "https://api.dexscreener.com";

/// Errors that can occur when talking to DexScreener
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl RateLimitSignal for MarketDataError {
    fn is_rate_limited(&self) -> bool {
        match self {
            MarketDataError::RateLimitExceeded => true,
            MarketDataError::ApiError { status, message } => {
                *status == 429 || message_indicates_rate_limit(message)
            }
            MarketDataError::HttpError(e) => e.status() == Some(StatusCode::TOO_MANY_REQUESTS),
            MarketDataError::ParseError(_) => false,
        }
    }
}

impl From<MarketDataError> for AnalysisError {
    fn from(e: MarketDataError) -> Self {
        if e.is_rate_limited() {
            AnalysisError::RateLimited(e.to_string())
        } else {
            AnalysisError::Transport(e.to_string())
        }
    }
}

/// Configuration for the DexScreener client
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub api_url: String,
    /// Chain whose pairs are kept
    pub chain_id: String,
    pub timeout: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chain_id: SOLANA_CHAIN_ID.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// DexScreener API client implementing [`MarketDataPort`]
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
    fetcher: RateLimitedFetcher,
}

impl DexScreenerClient {
    pub fn new(config: DexScreenerConfig, fetcher: RateLimitedFetcher) -> Result<Self, MarketDataError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http, fetcher })
    }

    pub fn config(&self) -> &DexScreenerConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Chain-filtered pairs for a token, in API order
    pub async fn token_pairs(&self, token_address: &str) -> Result<Vec<MarketPair>, MarketDataError> {
        let url = self.endpoint(&format!("/latest/dex/tokens/{}", token_address));
        let response: PairsResponse = self.get_json(&url).await?;
        Ok(self.normalize(response))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, MarketDataError> {
        tracing::debug!("GET {}", url);
        self.fetcher
            .execute(|| async {
                let response = self.http.get(url).send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(MarketDataError::RateLimitExceeded);
                }

                let body = response.text().await?;
                if !status.is_success() {
                    return Err(MarketDataError::ApiError {
                        status: status.as_u16(),
                        message: body.chars().take(200).collect(),
                    });
                }

                parse_body(&body)
            })
            .await
    }

    fn normalize(&self, response: PairsResponse) -> Vec<MarketPair> {
        response
            .into_pairs()
            .into_iter()
            .map(MarketPair::from)
            .filter(|p| p.chain_id == self.config.chain_id)
            .collect()
    }
}

/// Decode a JSON body, keeping serde's message for context
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::ParseError(e.to_string()))
}

#[async_trait]
impl MarketDataPort for DexScreenerClient {
    async fn resolve_market_pair(&self, token_address: &str) -> Result<Option<MarketPair>, AnalysisError> {
        let pairs = self.token_pairs(token_address).await?;
        let candidates = pairs.len();
        let best = select_best_pair(pairs, &self.config.chain_id);

        match &best {
            Some(pair) => tracing::debug!(
                "Best of {} {} pairs for {}: {} (${:.0} liquidity)",
                candidates,
                self.config.chain_id,
                token_address,
                pair.pair_address,
                pair.liquidity_usd
            ),
            None => tracing::info!("No {} pairs for {}", self.config.chain_id, token_address),
        }

        Ok(best)
    }

    async fn pair_by_address(&self, chain_id: &str, pair_address: &str) -> Result<Option<MarketPair>, AnalysisError> {
        let url = self.endpoint(&format!("/latest/dex/pairs/{}/{}", chain_id, pair_address));
        let response: PairsResponse = self.get_json(&url).await?;
        Ok(response
            .into_pairs()
            .into_iter()
            .map(MarketPair::from)
            .find(|p| p.pair_address == pair_address))
    }

    async fn search_pairs(&self, query: &str) -> Result<Vec<MarketPair>, AnalysisError> {
        let url = reqwest::Url::parse_with_params(&self.endpoint("/latest/dex/search"), &[("q", query)])
            .map_err(|e| AnalysisError::Transport(format!("invalid search URL: {}", e)))?;
        let response: PairsResponse = self.get_json(url.as_str()).await?;
        Ok(rank_pairs_by_liquidity(self.normalize(response), &self.config.chain_id))
    }

    async fn top_boosted_tokens(&self) -> Result<Vec<BoostedToken>, AnalysisError> {
        let url = self.endpoint("/token-boosts/top/v1");
        let tokens: Vec<RawBoostedToken> = self.get_json(&url).await?;
        let tokens: Vec<BoostedToken> = tokens
            .into_iter()
            .filter(|t| t.chain_id == self.config.chain_id)
            .map(BoostedToken::from)
            .collect();
        tracing::info!("Retrieved {} boosted {} tokens", tokens.len(), self.config.chain_id);
        Ok(tokens)
    }
}
