//! Analysis Errors
//!
//! The error kinds surfaced across the presentation boundary. Adapter errors
//! are folded into these at the service layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No data found: {0}")]
    NoDataFound(String),

    #[error("Computation invalid: {0}")]
    ComputationInvalid(String),
}

impl AnalysisError {
    /// Whether retrying the same request later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Transport(_) | AnalysisError::RateLimited(_))
    }
}
