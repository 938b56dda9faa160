use async_trait::async_trait;

use crate::domain::{AnalysisError, HolderAnalysis, MintAuthorities, TokenHolding};

/// On-chain data port trait
#[async_trait]
pub trait ChainDataPort: Send + Sync {
    /// Ranked top holders and total supply for a mint
    async fn holder_breakdown(&self, mint: &str) -> Result<HolderAnalysis, AnalysisError>;

    /// Mint/freeze authority state and raw supply
    async fn mint_authorities(&self, mint: &str) -> Result<MintAuthorities, AnalysisError>;

    /// SOL balance of a wallet
    async fn sol_balance(&self, owner: &str) -> Result<f64, AnalysisError>;

    /// SPL token balances of a wallet
    async fn token_holdings(&self, owner: &str) -> Result<Vec<TokenHolding>, AnalysisError>;
}
