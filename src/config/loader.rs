//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/zinc.toml.
//! Every section is optional; missing sections and fields keep their defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::dexscreener::{DexScreenerConfig, DEFAULT_API_URL};
use crate::adapters::fetch::RateLimitConfig;
use crate::adapters::social_feed::FeedConfig;
use crate::adapters::solana_rpc::{SolanaRpcConfig, DEFAULT_RPC_INTERVAL_MS, DEFAULT_RPC_URL};
use crate::domain::{validate_address, ScoringPolicy, WhaleMarkers, SOLANA_CHAIN_ID};

/// Config file used when no path is given and it exists
pub const DEFAULT_CONFIG_PATH: &str = "config/zinc.toml";

/// Main configuration structure matching config/zinc.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub market: MarketSection,
    pub rate_limit: RateLimitConfig,
    pub rpc: RpcSection,
    pub scoring: ScoringPolicy,
    pub feed: FeedSection,
    pub wallets: WalletsSection,
    pub watch: WatchSection,
    pub logging: LoggingSection,
}

/// Market data API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    /// DexScreener API base URL
    pub api_url: String,
    /// Chain whose pairs are considered
    pub chain_id: String,
    pub timeout_secs: u64,
    /// Boosted tokens shown by `trending`
    pub trending_limit: usize,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chain_id: SOLANA_CHAIN_ID.to_string(),
            timeout_secs: 15,
            trending_limit: 10,
        }
    }
}

impl MarketSection {
    pub fn client_config(&self) -> DexScreenerConfig {
        DexScreenerConfig {
            api_url: self.api_url.clone(),
            chain_id: self.chain_id.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Solana RPC section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSection {
    /// Ordered endpoints; the first is primary, the rest are fallbacks
    pub endpoints: Vec<String>,
    /// Attempts per endpoint
    pub max_attempts: u32,
    /// Delay step between attempts (attempt index × step)
    pub retry_step_ms: u64,
    pub timeout_secs: u64,
    /// Commitment level: "processed", "confirmed", "finalized"
    pub commitment: String,
    /// Throttle for RPC calls, separate from the market API's
    pub rate_limit: RateLimitConfig,
}

impl Default for RpcSection {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_RPC_URL.to_string()],
            max_attempts: 3,
            retry_step_ms: 1_000,
            timeout_secs: 30,
            commitment: "confirmed".to_string(),
            rate_limit: RateLimitConfig::spacing_only(DEFAULT_RPC_INTERVAL_MS),
        }
    }
}

impl RpcSection {
    pub fn client_config(&self) -> SolanaRpcConfig {
        SolanaRpcConfig {
            endpoints: self.endpoints.clone(),
            max_attempts: self.max_attempts,
            retry_step: Duration::from_millis(self.retry_step_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            commitment: self.commitment.clone(),
            rate_limit: self.rate_limit.clone(),
        }
    }
}

/// Whale feed section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// JSON Feed URL (RSS-to-JSON bridge); `whales` is unavailable without it
    pub url: Option<String>,
    pub markers: WhaleMarkers,
    /// Maximum alerts shown
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            url: None,
            markers: WhaleMarkers::default(),
            limit: 20,
            timeout_secs: 15,
        }
    }
}

impl FeedSection {
    /// Client config, `None` when no feed URL is configured
    pub fn client_config(&self) -> Option<FeedConfig> {
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(FeedConfig {
            url: url.to_string(),
            markers: self.markers.clone(),
            limit: self.limit,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Wallet book section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletsSection {
    /// Wallet book file; `~` is expanded
    pub store_path: String,
}

impl Default for WalletsSection {
    fn default() -> Self {
        Self {
            store_path: "~/.zinc/wallets.json".to_string(),
        }
    }
}

impl WalletsSection {
    /// Store path with `~` expanded
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store_path).into_owned())
    }
}

/// Watchlist section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    pub interval_secs: u64,
    /// Token mints watched when none are given on the command line
    pub tokens: Vec<String>,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            tokens: Vec::new(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const COMMITMENTS: [&str; 3] = ["processed", "confirmed", "finalized"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Load from `path`, or from `config/zinc.toml` when present, or defaults.
    /// Environment overrides are applied last.
    pub fn resolve(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)?,
            None => Config::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// `SOLANA_RPC_URL` becomes the primary endpoint; `ZINC_DEXSCREENER_URL`
    /// replaces the market API URL
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SOLANA_RPC_URL").filter(|u| !u.trim().is_empty()) {
            let url = url.trim().to_string();
            self.rpc.endpoints.retain(|e| e.trim() != url);
            self.rpc.endpoints.insert(0, url);
        }

        if let Some(url) = lookup("ZINC_DEXSCREENER_URL").filter(|u| !u.trim().is_empty()) {
            self.market.api_url = url.trim().to_string();
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.market.api_url) {
            return Err(ConfigError::ValidationError(format!(
                "market.api_url must be an http(s) URL, got '{}'",
                self.market.api_url
            )));
        }
        if self.market.chain_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "market.chain_id must not be empty".to_string(),
            ));
        }
        if self.market.trending_limit == 0 {
            return Err(ConfigError::ValidationError(
                "market.trending_limit must be > 0".to_string(),
            ));
        }

        self.rate_limit
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("rate_limit: {}", e)))?;

        self.rpc
            .rate_limit
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("rpc.rate_limit: {}", e)))?;

        if self.rpc.endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "rpc.endpoints must contain at least one URL".to_string(),
            ));
        }
        if let Some(bad) = self
            .rpc
            .endpoints
            .iter()
            .find(|e| !e.trim().is_empty() && !is_http_url(e))
        {
            return Err(ConfigError::ValidationError(format!(
                "rpc endpoint must be an http(s) URL, got '{}'",
                bad
            )));
        }
        if self.rpc.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "rpc.max_attempts must be >= 1".to_string(),
            ));
        }
        if !COMMITMENTS.contains(&self.rpc.commitment.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "rpc.commitment must be one of {:?}, got '{}'",
                COMMITMENTS, self.rpc.commitment
            )));
        }

        self.scoring
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("scoring: {}", e)))?;

        if let Some(url) = self.feed.url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !is_http_url(url) {
                return Err(ConfigError::ValidationError(format!(
                    "feed.url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        if self.feed.markers.buy.is_empty() && self.feed.markers.sell.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.markers needs at least one buy or sell marker".to_string(),
            ));
        }

        if self.wallets.store_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "wallets.store_path must not be empty".to_string(),
            ));
        }

        if self.watch.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "watch.interval_secs must be >= 1".to_string(),
            ));
        }
        for token in &self.watch.tokens {
            validate_address(token)
                .map_err(|e| ConfigError::ValidationError(format!("watch.tokens: {}", e)))?;
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://")
}
