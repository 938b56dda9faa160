use async_trait::async_trait;

use crate::domain::{AnalysisError, BoostedToken, MarketPair};

/// Market data port trait
///
/// Implementations filter results to the chain they were configured for.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Best pair for a token (highest liquidity), or `None` when the token
    /// has no pairs on the configured chain
    async fn resolve_market_pair(&self, token_address: &str)
        -> Result<Option<MarketPair>, AnalysisError>;

    /// Look up a single pair by pool address
    async fn pair_by_address(&self, chain_id: &str, pair_address: &str)
        -> Result<Option<MarketPair>, AnalysisError>;

    /// Free-text search, highest liquidity first
    async fn search_pairs(&self, query: &str) -> Result<Vec<MarketPair>, AnalysisError>;

    /// Tokens currently on the boost board
    async fn top_boosted_tokens(&self) -> Result<Vec<BoostedToken>, AnalysisError>;
}
