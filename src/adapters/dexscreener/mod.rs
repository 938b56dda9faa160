//! DexScreener market data adapter

pub mod types;
pub mod client;

pub use client::{DexScreenerClient, DexScreenerConfig, MarketDataError, DEFAULT_API_URL};
