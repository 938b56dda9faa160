use std::time::Duration;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::fetch::{RateLimitSignal, RateLimitedFetcher};
use crate::domain::{filter_whale_alerts, AnalysisError, FeedItem, WhaleAlert, WhaleMarkers};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Feed returned {status}")]
    Status { status: u16 },

    #[error("Failed to parse feed: {0}")]
    ParseError(String),
}

impl RateLimitSignal for FeedError {
    fn is_rate_limited(&self) -> bool {
        match self {
            FeedError::Status { status } => *status == 429,
            FeedError::HttpError(e) => e.status() == Some(StatusCode::TOO_MANY_REQUESTS),
            FeedError::ParseError(_) => false,
        }
    }
}

impl From<FeedError> for AnalysisError {
    fn from(e: FeedError) -> Self {
        if e.is_rate_limited() {
            AnalysisError::RateLimited(e.to_string())
        } else {
            AnalysisError::Transport(e.to_string())
        }
    }
}

/// JSON Feed document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub markers: WhaleMarkers,
    /// Maximum alerts returned
    pub limit: usize,
    pub timeout: Duration,
}

/// Fetches the feed and classifies whale items
#[derive(Debug, Clone)]
pub struct FeedClient {
    config: FeedConfig,
    http: Client,
    fetcher: RateLimitedFetcher,
}

impl FeedClient {
    pub fn new(config: FeedConfig, fetcher: RateLimitedFetcher) -> Result<Self, FeedError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http, fetcher })
    }

    /// Raw feed items
    pub async fn fetch_items(&self) -> Result<Vec<FeedItem>, FeedError> {
        let url = self.config.url.as_str();
        self.fetcher
            .execute(|| async {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FeedError::Status { status: status.as_u16() });
                }
                let body = response.text().await?;
                parse_feed(&body)
            })
            .await
    }

    /// Whale alerts, newest first, capped at the configured limit
    pub async fn whale_alerts(&self) -> Result<Vec<WhaleAlert>, FeedError> {
        let items = self.fetch_items().await?;
        let total = items.len();
        let mut alerts = filter_whale_alerts(items, &self.config.markers);
        alerts.truncate(self.config.limit);
        tracing::debug!("{} of {} feed items are whale alerts", alerts.len(), total);
        Ok(alerts)
    }
}

pub fn parse_feed(body: &str) -> Result<Vec<FeedItem>, FeedError> {
    let document: FeedDocument =
        serde_json::from_str(body).map_err(|e| FeedError::ParseError(e.to_string()))?;
    Ok(document.items)
}
