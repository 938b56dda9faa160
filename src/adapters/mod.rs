//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Fetch: rate limiting, retry and RPC endpoint failover
//! - DexScreener: market pairs, search and boosted tokens
//! - Solana RPC: holder breakdowns, mint authorities and wallet balances
//! - Social feed: whale buy/sell alerts
//! - CLI: Command-line interface and text output

pub mod fetch;
pub mod dexscreener;
pub mod solana_rpc;
pub mod social_feed;
pub mod cli;

pub use fetch::{RateLimitedFetcher, RetryPolicy, EndpointRotation};
pub use dexscreener::DexScreenerClient;
pub use solana_rpc::SolanaChainClient;
pub use social_feed::FeedClient;
pub use cli::CliApp;
