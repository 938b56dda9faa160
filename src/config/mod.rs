//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, load_config, DEFAULT_CONFIG_PATH,
    MarketSection, RpcSection, FeedSection, WalletsSection, WatchSection, LoggingSection,
};
