//! Domain Layer - Core logic for Zinc
//!
//! This module contains pure domain types and logic with no network access.
//! All external interactions happen through the ports layer.
//!
//! - `market_pair`: normalized pairs and best-pair selection
//! - `holders`: holder ranking and concentration
//! - `safety_score`: point-weighted token safety model
//! - `whale_alert`: whale buy/sell feed classification
//! - `wallet_book`: persisted tracked wallets
//! - `portfolio`: wallet balance snapshots

pub mod error;
pub mod address;
pub mod market_pair;
pub mod holders;
pub mod safety_score;
pub mod whale_alert;
pub mod wallet_book;
pub mod portfolio;

pub use error::AnalysisError;
pub use address::{validate_address, short_address};
pub use market_pair::{MarketPair, TokenRef, BoostedToken, select_best_pair, rank_pairs_by_liquidity, SOLANA_CHAIN_ID};
pub use holders::{
    HolderAnalysis, HolderRecord, RawHolderAccount, TokenSupply, MintAuthorities,
    build_holder_analysis, normalize_amount, TOP_HOLDER_LIMIT,
};
pub use safety_score::{
    SafetyScorer, ScoringPolicy, Tier, CadenceTier, ScoreBreakdown, SafetyMetrics,
    TokenSafetyAnalysis, RiskTier, SafetyNote, NoteSeverity,
};
pub use whale_alert::{FeedItem, WhaleAlert, WhaleDirection, WhaleMarkers, filter_whale_alerts};
pub use wallet_book::{WalletBook, WalletBookError, TrackedWallet};
pub use portfolio::{WalletPortfolio, TokenHolding, lamports_to_sol};
