//! Watchlist Monitor
//!
//! Periodically refreshes the best market pair for a set of tokens and
//! streams snapshots to a channel. A token whose previous refresh is still
//! running is skipped for that tick. `stop` cancels in-flight refreshes;
//! nothing is emitted after it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;

use crate::domain::{validate_address, AnalysisError, MarketPair};
use crate::ports::MarketDataPort;

/// Latest market state of one watched token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchSnapshot {
    pub token_address: String,
    pub pair: Option<MarketPair>,
    pub fetched_at: DateTime<Utc>,
}

pub struct WatchlistMonitor<M: MarketDataPort + 'static> {
    market: Arc<M>,
    tokens: Vec<String>,
    poll_interval: Duration,
    in_flight: Arc<Mutex<HashSet<String>>>,
    shutdown: watch::Sender<bool>,
}

impl<M: MarketDataPort + 'static> WatchlistMonitor<M> {
    /// Fails on the first token that is not a valid address
    pub fn new(market: Arc<M>, tokens: Vec<String>, poll_interval: Duration) -> Result<Self, AnalysisError> {
        let mut unique: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = validate_address(&token)?.to_string();
            if !unique.contains(&token) {
                unique.push(token);
            }
        }

        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            market,
            tokens: unique,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            shutdown,
        })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Stop the loop and cancel in-flight refreshes
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Refresh every token each interval until stopped
    pub async fn run(&self, snapshots: mpsc::Sender<WatchSnapshot>) {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow_and_update() {
            return;
        }

        tracing::info!(
            "Watching {} token(s), refresh every {:?}",
            self.tokens.len(),
            self.poll_interval
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for token in &self.tokens {
                        self.spawn_refresh(token.clone(), snapshots.clone());
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Watchlist monitor stopped");
    }

    /// Refresh one token now. `None` when it was already in flight, failed,
    /// or the monitor was stopped.
    pub async fn refresh_token(&self, token: &str) -> Option<WatchSnapshot> {
        let mut shutdown = self.shutdown.subscribe();
        refresh(&*self.market, &self.in_flight, &mut shutdown, token.to_string()).await
    }

    fn spawn_refresh(&self, token: String, snapshots: mpsc::Sender<WatchSnapshot>) {
        let market = Arc::clone(&self.market);
        let in_flight = Arc::clone(&self.in_flight);
        let mut shutdown = self.shutdown.subscribe();

        tokio::spawn(async move {
            let snapshot = refresh(&*market, &in_flight, &mut shutdown, token).await;
            if let Some(snapshot) = snapshot {
                if *shutdown.borrow() {
                    return;
                }
                if snapshots.send(snapshot).await.is_err() {
                    tracing::debug!("Snapshot receiver dropped");
                }
            }
        });
    }
}

async fn refresh<M: MarketDataPort>(
    market: &M,
    in_flight: &Mutex<HashSet<String>>,
    shutdown: &mut watch::Receiver<bool>,
    token: String,
) -> Option<WatchSnapshot> {
    if *shutdown.borrow() {
        return None;
    }
    if !in_flight.lock().await.insert(token.clone()) {
        tracing::debug!("Refresh for {} still in flight, skipping", token);
        return None;
    }

    let outcome = tokio::select! {
        result = market.resolve_market_pair(&token) => Some(result),
        _ = async {
            let _ = shutdown.wait_for(|stopped| *stopped).await;
        } => None,
    };

    in_flight.lock().await.remove(&token);

    match outcome {
        Some(Ok(pair)) => Some(WatchSnapshot {
            token_address: token,
            pair,
            fetched_at: Utc::now(),
        }),
        Some(Err(e)) => {
            tracing::warn!("Refresh for {} failed: {}", token, e);
            None
        }
        None => {
            tracing::debug!("Refresh for {} cancelled", token);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_pair::fixtures::pair;
    use crate::ports::mocks::MockMarketData;

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    #[test]
    fn test_new_rejects_invalid_token() {
        let result = WatchlistMonitor::new(
            Arc::new(MockMarketData::new()),
            vec!["0OIl".to_string()],
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(AnalysisError::InvalidAddress(_))));
    }

    #[test]
    fn test_new_dedupes_tokens() {
        let monitor = WatchlistMonitor::new(
            Arc::new(MockMarketData::new()),
            vec![MINT.to_string(), format!(" {} ", MINT)],
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(monitor.tokens(), &[MINT.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_emits_snapshots() {
        let market = Arc::new(MockMarketData::new().with_pair(MINT, pair("solana", "Pool1", 50_000.0)));
        let monitor = Arc::new(
            WatchlistMonitor::new(market, vec![MINT.to_string()], Duration::from_secs(1)).unwrap(),
        );
        let (tx, mut rx) = mpsc::channel(8);

        let runner = {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move { monitor.run(tx).await })
        };

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.token_address, MINT);
        assert_eq!(snapshot.pair.map(|p| p.pair_address), Some("Pool1".to_string()));

        monitor.stop();
        runner.await.unwrap();
        assert!(monitor.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refresh_is_skipped() {
        let market = Arc::new(MockMarketData::new().with_delay(Duration::from_secs(5)));
        let monitor = WatchlistMonitor::new(Arc::clone(&market), vec![MINT.to_string()], Duration::from_secs(1)).unwrap();

        let (first, second) = tokio::join!(monitor.refresh_token(MINT), monitor.refresh_token(MINT));

        assert!(first.is_some() ^ second.is_some());
        assert_eq!(market.get_calls().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_refresh_skips_ticks_and_stop_cancels() {
        let market = Arc::new(
            MockMarketData::new()
                .with_pair(MINT, pair("solana", "Pool1", 50_000.0))
                .with_delay(Duration::from_secs(5)),
        );
        let monitor = Arc::new(
            WatchlistMonitor::new(Arc::clone(&market), vec![MINT.to_string()], Duration::from_secs(1)).unwrap(),
        );
        let (tx, mut rx) = mpsc::channel(8);

        let runner = {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move { monitor.run(tx).await })
        };

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        monitor.stop();
        runner.await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(market.get_calls().await, vec![format!("resolve:{}", MINT)]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stop_before_run_returns_immediately() {
        let monitor = WatchlistMonitor::new(
            Arc::new(MockMarketData::new()),
            vec![MINT.to_string()],
            Duration::from_secs(1),
        )
        .unwrap();
        let (tx, _rx) = mpsc::channel(1);

        monitor.stop();
        monitor.run(tx).await;
        assert!(monitor.refresh_token(MINT).await.is_none());
    }
}
