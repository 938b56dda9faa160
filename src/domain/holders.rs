//! Holder Concentration
//!
//! Turns raw largest-account and supply data into a ranked top-N holder list
//! with per-holder and aggregate supply percentages.

use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

/// Number of holders kept in a breakdown
pub const TOP_HOLDER_LIMIT: usize = 10;

/// Floating point slack allowed above 100% before data is considered malformed
const PERCENT_EPSILON: f64 = 1e-6;

/// A token account as returned by the largest-accounts query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHolderAccount {
    pub address: String,
    /// Amount in base units
    pub amount: u64,
}

/// Mint supply in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSupply {
    pub amount: u64,
    pub decimals: u8,
}

impl TokenSupply {
    pub fn new(amount: u64, decimals: u8) -> Self {
        Self { amount, decimals }
    }

    /// Supply in whole tokens
    pub fn ui_amount(&self) -> f64 {
        normalize_amount(self.amount, self.decimals)
    }
}

/// Convert base units to whole tokens
pub fn normalize_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

/// One ranked holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderRecord {
    pub address: String,
    pub raw_amount: u64,
    /// Amount in whole tokens
    pub amount: f64,
    /// Share of total supply in percent
    pub percentage: f64,
}

/// Ranked holder breakdown for a mint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderAnalysis {
    /// Top holders by amount, descending
    pub holders: Vec<HolderRecord>,
    /// Total supply in whole tokens
    pub total_supply: f64,
    pub raw_supply: u64,
    pub decimals: u8,
    /// Sum of `holders[..].percentage`
    pub top_holders_pct: f64,
}

impl HolderAnalysis {
    /// Largest single holder share in percent
    pub fn largest_holder_pct(&self) -> f64 {
        self.holders.first().map(|h| h.percentage).unwrap_or(0.0)
    }
}

/// Build a holder breakdown from raw RPC data.
///
/// Fails with `ComputationInvalid` when supply is zero, the holder list is
/// empty, or the resulting percentages are not finite or exceed 100%.
pub fn build_holder_analysis(
    accounts: Vec<RawHolderAccount>,
    supply: TokenSupply,
) -> Result<HolderAnalysis, AnalysisError> {
    if supply.amount == 0 {
        return Err(AnalysisError::ComputationInvalid(
            "total supply is zero".to_string(),
        ));
    }
    if accounts.is_empty() {
        return Err(AnalysisError::ComputationInvalid(
            "holder list is empty".to_string(),
        ));
    }

    let mut accounts = accounts;
    accounts.sort_by(|a, b| b.amount.cmp(&a.amount));
    accounts.truncate(TOP_HOLDER_LIMIT);

    let raw_supply = supply.amount as f64;
    let holders: Vec<HolderRecord> = accounts
        .into_iter()
        .map(|account| HolderRecord {
            amount: normalize_amount(account.amount, supply.decimals),
            percentage: account.amount as f64 / raw_supply * 100.0,
            raw_amount: account.amount,
            address: account.address,
        })
        .collect();

    let top_holders_pct = validate_concentration(holders.iter().map(|h| h.percentage).sum())?;

    Ok(HolderAnalysis {
        holders,
        total_supply: supply.ui_amount(),
        raw_supply: supply.amount,
        decimals: supply.decimals,
        top_holders_pct,
    })
}

/// Check an aggregate holder percentage, clamping float noise just above 100
pub fn validate_concentration(pct: f64) -> Result<f64, AnalysisError> {
    if !pct.is_finite() {
        return Err(AnalysisError::ComputationInvalid(format!(
            "holder concentration is not finite: {}",
            pct
        )));
    }
    if pct < 0.0 || pct > 100.0 + PERCENT_EPSILON {
        return Err(AnalysisError::ComputationInvalid(format!(
            "holder concentration {:.4}% is outside 0-100%",
            pct
        )));
    }
    Ok(pct.min(100.0))
}

/// Mint and freeze authority state of a token mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAuthorities {
    /// Mint authority (None = revoked)
    pub mint_authority: Option<String>,
    /// Freeze authority (None = revoked)
    pub freeze_authority: Option<String>,
    /// Supply in base units
    pub supply: u64,
    pub decimals: u8,
}

impl MintAuthorities {
    pub fn mint_revoked(&self) -> bool {
        self.mint_authority.is_none()
    }

    pub fn freeze_revoked(&self) -> bool {
        self.freeze_authority.is_none()
    }
}
