//! Social feed adapter
//!
//! Reads a JSON Feed (RSS-to-JSON bridge output) and keeps whale buy/sell
//! items.

pub mod client;

pub use client::{FeedClient, FeedConfig, FeedError};
