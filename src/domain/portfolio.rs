//! Wallet portfolio snapshot

use serde::{Deserialize, Serialize};

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// SPL token balance held by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHolding {
    pub mint: String,
    /// Amount in whole tokens
    pub amount: f64,
    pub decimals: u8,
}

/// Balances of one tracked wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletPortfolio {
    pub address: String,
    pub name: Option<String>,
    pub sol_balance: f64,
    /// Non-zero token balances, largest first
    pub tokens: Vec<TokenHolding>,
}

impl WalletPortfolio {
    pub fn new(address: String, name: Option<String>, sol_balance: f64, tokens: Vec<TokenHolding>) -> Self {
        let mut tokens: Vec<TokenHolding> = tokens.into_iter().filter(|t| t.amount > 0.0).collect();
        tokens.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        Self {
            address,
            name,
            sol_balance,
            tokens,
        }
    }

    /// Balance of a specific mint, 0 when not held
    pub fn token_balance(&self, mint: &str) -> f64 {
        self.tokens
            .iter()
            .find(|t| t.mint == mint)
            .map(|t| t.amount)
            .unwrap_or(0.0)
    }
}

/// Convert lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
