//! Rate-Limited Fetcher
//!
//! Spaces outbound calls by a minimum interval and backs off when an upstream
//! reports rate limiting. State lives in the fetcher instance; clones share it,
//! so every caller of one fetcher is throttled against the same window.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Errors that can tell whether they were caused by upstream rate limiting
pub trait RateLimitSignal {
    fn is_rate_limited(&self) -> bool;
}

/// JSON-RPC error codes used for rate limiting
pub const RATE_LIMIT_RPC_CODES: [i64; 2] = [429, -32429];

/// Heuristic for error messages that describe a rate limit
pub fn message_indicates_rate_limit(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("429")
        || message.contains("rate limit")
        || message.contains("rate-limit")
        || message.contains("too many requests")
}

/// Fetcher timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum spacing between calls (milliseconds)
    pub min_interval_ms: u64,
    /// Base backoff delay (milliseconds)
    pub base_delay_ms: u64,
    /// Backoff cap, also the cooldown wait (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1_000,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RateLimitConfig {
    /// Spacing and error counting only; backoff is left to the caller's retry policy
    pub fn spacing_only(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_delay_ms > self.max_delay_ms {
            return Err(format!(
                "base_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }
}

/// Mutable throttle state
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitState {
    /// Start time reserved by the most recent call
    pub last_fetch: Option<Instant>,
    /// Consecutive rate-limited failures
    pub error_count: u32,
    /// Backoff applied after the last rate-limited failure
    pub current_delay: Duration,
    /// Next call waits the full backoff cap first
    pub cooldown: bool,
}

impl RateLimitState {
    fn new(base_delay: Duration) -> Self {
        Self {
            last_fetch: None,
            error_count: 0,
            current_delay: base_delay,
            cooldown: false,
        }
    }
}

/// Wraps async calls with spacing, cooldown and backoff. Never retries.
#[derive(Debug, Clone)]
pub struct RateLimitedFetcher {
    config: RateLimitConfig,
    state: Arc<Mutex<RateLimitState>>,
}

impl RateLimitedFetcher {
    pub fn new(config: RateLimitConfig) -> Self {
        let state = RateLimitState::new(config.base_delay());
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Copy of the current throttle state
    pub async fn snapshot(&self) -> RateLimitState {
        self.state.lock().await.clone()
    }

    /// Run `op` once under the rate limit.
    ///
    /// A rate-limited failure sleeps for the computed backoff before the
    /// original error is returned.
    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RateLimitSignal + std::fmt::Display,
    {
        self.wait_for_slot().await;

        match op().await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(e) => {
                if e.is_rate_limited() {
                    let (delay, errors) = self.record_rate_limit().await;
                    tracing::warn!(
                        "Rate limited ({}), backing off for {:?} (consecutive: {})",
                        e,
                        delay,
                        errors
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e)
            }
        }
    }

    /// Reserve the next start time and sleep until it arrives
    async fn wait_for_slot(&self) {
        let wait = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            let mut start = now;

            if state.cooldown {
                start = now + self.config.max_delay();
                state.cooldown = false;
            }

            if let Some(last) = state.last_fetch {
                let earliest = last + self.config.min_interval();
                if earliest > start {
                    start = earliest;
                }
            }

            state.last_fetch = Some(start);
            start.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            tracing::debug!("Throttling request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    async fn record_success(&self) {
        let mut state = self.state.lock().await;
        state.error_count = 0;
        state.current_delay = self.config.base_delay();
    }

    async fn record_rate_limit(&self) -> (Duration, u32) {
        let mut state = self.state.lock().await;
        state.cooldown = true;
        state.error_count = state.error_count.saturating_add(1);
        state.current_delay = backoff_delay(
            self.config.base_delay(),
            self.config.max_delay(),
            state.error_count,
        );
        (state.current_delay, state.error_count)
    }
}

/// `min(base × 2^errors, max)` without overflow
pub fn backoff_delay(base: Duration, max: Duration, errors: u32) -> Duration {
    let factor = 2u32.checked_pow(errors).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError {
        rate_limited: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            if self.rate_limited {
                write!(f, "HTTP 429")
            } else {
                write!(f, "connection reset")
            }
        }
    }

    impl RateLimitSignal for TestError {
        fn is_rate_limited(&self) -> bool {
            self.rate_limited
        }
    }

    fn config() -> RateLimitConfig {
        RateLimitConfig {
            min_interval_ms: 1_000,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }

    #[test]
    fn test_message_indicates_rate_limit() {
        assert!(message_indicates_rate_limit("HTTP 429 Too Many Requests"));
        assert!(message_indicates_rate_limit("Rate limit exceeded"));
        assert!(message_indicates_rate_limit("rpc error -32429"));
        assert!(!message_indicates_rate_limit("connection refused"));
    }

    #[test]
    fn test_backoff_delay() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(30);
        assert_eq!(backoff_delay(base, max, 1), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, max, 3), Duration::from_secs(8));
        assert_eq!(backoff_delay(base, max, 5), Duration::from_secs(30));
        assert_eq!(backoff_delay(base, max, 64), Duration::from_secs(30));
    }

    #[test]
    fn test_config_validation() {
        assert!(RateLimitConfig::default().validate().is_ok());
        let bad = RateLimitConfig {
            base_delay_ms: 5_000,
            max_delay_ms: 1_000,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_only_counts_without_sleeping() {
        let fetcher = RateLimitedFetcher::new(RateLimitConfig::spacing_only(0));
        let start = Instant::now();

        let _ = fetcher
            .execute(|| async { Err::<(), _>(TestError { rate_limited: true }) })
            .await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(fetcher.snapshot().await.error_count, 1);

        fetcher.execute(|| async { Ok::<_, TestError>(()) }).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(fetcher.snapshot().await.error_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let fetcher = RateLimitedFetcher::new(config());
        let start = Instant::now();

        let result = fetcher.execute(|| async { Ok::<_, TestError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced() {
        let fetcher = RateLimitedFetcher::new(config());
        let start = Instant::now();

        for _ in 0..3 {
            fetcher.execute(|| async { Ok::<_, TestError>(()) }).await.unwrap();
        }

        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_window() {
        let fetcher = RateLimitedFetcher::new(config());
        let other = fetcher.clone();
        let start = Instant::now();

        let (a, b) = tokio::join!(
            fetcher.execute(|| async { Ok::<_, TestError>(Instant::now()) }),
            other.execute(|| async { Ok::<_, TestError>(Instant::now()) }),
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        let gap = if a > b { a - b } else { b - a };
        assert_eq!(gap, Duration::from_secs(1));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_backs_off_and_sets_cooldown() {
        let fetcher = RateLimitedFetcher::new(config());
        let start = Instant::now();

        let result = fetcher
            .execute(|| async { Err::<(), _>(TestError { rate_limited: true }) })
            .await;
        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::from_secs(2));

        let state = fetcher.snapshot().await;
        assert!(state.cooldown);
        assert_eq!(state.error_count, 1);
        assert_eq!(state.current_delay, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_waits_max_delay_then_success_resets() {
        let fetcher = RateLimitedFetcher::new(config());

        let _ = fetcher
            .execute(|| async { Err::<(), _>(TestError { rate_limited: true }) })
            .await;

        let before = Instant::now();
        fetcher.execute(|| async { Ok::<_, TestError>(()) }).await.unwrap();
        assert_eq!(before.elapsed(), Duration::from_secs(30));

        let state = fetcher.snapshot().await;
        assert!(!state.cooldown);
        assert_eq!(state.error_count, 0);
        assert_eq!(state.current_delay, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_leave_state_alone() {
        let fetcher = RateLimitedFetcher::new(config());
        let start = Instant::now();

        let result = fetcher
            .execute(|| async { Err::<(), _>(TestError { rate_limited: false }) })
            .await;
        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);

        let state = fetcher.snapshot().await;
        assert!(!state.cooldown);
        assert_eq!(state.error_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetcher_does_not_retry() {
        let fetcher = RateLimitedFetcher::new(config());
        let calls = AtomicU32::new(0);

        let _ = fetcher
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError { rate_limited: true })
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
