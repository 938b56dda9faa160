//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data (pairs, search, boosted tokens)
//! - Chain data (holders, mint authorities, wallet balances)

pub mod market_data;
pub mod chain_data;
pub mod mocks;

pub use market_data::MarketDataPort;
pub use chain_data::ChainDataPort;
