//! Bounded retry with configurable backoff

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `attempt × step` after the n-th failed attempt
    Linear(Duration),
    /// `base × 2^(attempt-1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Linear(step) => step.saturating_mul(attempt),
            Backoff::Exponential { base, max } => {
                let factor = 2u32
                    .checked_pow(attempt.saturating_sub(1))
                    .unwrap_or(u32::MAX);
                base.checked_mul(factor).unwrap_or(max).min(max)
            }
        }
    }
}

/// Attempt budget plus delay schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three attempts, one second per attempt index
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear(Duration::from_secs(1)),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Run `operation` until it succeeds, the error is not retryable, or the
    /// attempt budget is spent. No delay follows the final attempt.
    pub async fn run<F, Fut, T, E, P>(
        &self,
        label: &str,
        mut operation: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if !is_retryable(&e) {
                        debug!("{} failed with non-retryable error: {}", label, e);
                        return Err(e);
                    }
                    if attempt >= max_attempts {
                        warn!("{} failed after {} attempts: {}", label, attempt, e);
                        return Err(e);
                    }

                    let delay = self.backoff.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {} - retrying in {}ms",
                        label,
                        attempt,
                        max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[derive(Debug)]
    struct TestError {
        kind: &'static str,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "TestError: {}", self.kind)
        }
    }

    #[test]
    fn test_linear_delay() {
        let backoff = Backoff::Linear(Duration::from_secs(1));
        assert_eq!(backoff.delay_for(1), Duration::from_secs(1));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(500),
            max: Duration::from_secs(4),
        };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(500));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(2));
        assert_eq!(backoff.delay_for(10), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let result = RetryPolicy::default()
            .run("op", || async { Ok::<_, TestError>(42) }, |_| true)
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_then_success_costs_one_interval() {
        let mut attempts = 0;
        let start = Instant::now();

        let result = RetryPolicy::default()
            .run(
                "getTokenLargestAccounts",
                || {
                    attempts += 1;
                    let current = attempts;
                    async move {
                        if current == 1 {
                            Err(TestError { kind: "429" })
                        } else {
                            Ok("holders")
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), "holders");
        assert_eq!(attempts, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget_without_trailing_delay() {
        let mut attempts = 0;
        let start = Instant::now();

        let result = RetryPolicy::default()
            .run(
                "op",
                || {
                    attempts += 1;
                    async { Err::<(), _>(TestError { kind: "timeout" }) }
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(attempts, 3);
        // 1s after attempt 1, 2s after attempt 2, nothing after attempt 3
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let mut attempts = 0;

        let result = RetryPolicy::default()
            .run(
                "op",
                || {
                    attempts += 1;
                    async { Err::<(), _>(TestError { kind: "fatal" }) }
                },
                |e| e.kind != "fatal",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        let policy = RetryPolicy::new(0, Backoff::Linear(Duration::from_secs(1)));
        assert_eq!(policy.max_attempts, 1);
    }
}
