//! Zinc - Solana token dashboard library
//!
//! Market data, holder concentration and safety scoring for Solana tokens.
//!
//! # Modules
//!
//! - `domain`: Core logic (MarketPair, HolderAnalysis, SafetyScorer, WalletBook)
//! - `ports`: Trait abstractions (MarketDataPort, ChainDataPort)
//! - `adapters`: External implementations (DexScreener, Solana RPC, social feed, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Analysis service and watchlist monitor

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
