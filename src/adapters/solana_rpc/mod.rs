//! Solana JSON-RPC adapter
//!
//! Implements `ChainDataPort` with plain JSON-RPC over reqwest: holder
//! breakdowns, mint authorities and wallet balances.

pub mod types;
pub mod transport;
pub mod client;

pub use client::{SolanaChainClient, SolanaRpcConfig, DEFAULT_RPC_INTERVAL_MS, DEFAULT_RPC_URL};
pub use transport::{ChainRpcError, HttpRpcTransport, RpcTransport};
pub use types::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
