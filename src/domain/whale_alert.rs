//! Whale Alerts
//!
//! Classifies social feed items into whale buy/sell alerts by title markers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw item from the JSON feed bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhaleDirection {
    Buy,
    Sell,
}

/// Title markers that identify whale activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhaleMarkers {
    pub buy: Vec<String>,
    pub sell: Vec<String>,
}

impl Default for WhaleMarkers {
    fn default() -> Self {
        Self {
            buy: vec!["whale buy".to_string(), "🟢".to_string()],
            sell: vec!["whale sell".to_string(), "🔴".to_string()],
        }
    }
}

impl WhaleMarkers {
    /// Direction for a title, if any marker matches. Buy markers win when both match.
    pub fn classify(&self, title: &str) -> Option<WhaleDirection> {
        let title = title.to_lowercase();
        let hit = |markers: &[String]| markers.iter().any(|m| title.contains(&m.to_lowercase()));

        if hit(&self.buy) {
            Some(WhaleDirection::Buy)
        } else if hit(&self.sell) {
            Some(WhaleDirection::Sell)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhaleAlert {
    pub id: String,
    pub title: String,
    pub direction: WhaleDirection,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

/// Keep whale items, newest first. Items without a parseable date sort last.
pub fn filter_whale_alerts(items: Vec<FeedItem>, markers: &WhaleMarkers) -> Vec<WhaleAlert> {
    let mut alerts: Vec<WhaleAlert> = items
        .into_iter()
        .filter_map(|item| {
            let direction = markers.classify(&item.title)?;
            let published_at = item
                .date_published
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc));
            Some(WhaleAlert {
                id: item.id,
                title: item.title,
                direction,
                published_at,
                url: item.url,
            })
        })
        .collect();

    alerts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    alerts
}
