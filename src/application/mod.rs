//! Application Layer - Services built on the ports
//!
//! - `analysis_service`: presentation boundary for scoring, holders and wallets
//! - `watchlist`: periodic market refresh for a set of tokens

pub mod analysis_service;
pub mod watchlist;

pub use analysis_service::{AnalysisService, TrendingToken};
pub use watchlist::{WatchSnapshot, WatchlistMonitor};
