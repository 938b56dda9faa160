//! Ordered endpoint failover

use std::future::Future;
use thiserror::Error;
use tracing::warn;

use super::retry::RetryPolicy;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("at least one endpoint is required")]
pub struct EmptyEndpointList;

/// Primary endpoint plus ordered fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRotation {
    primary: String,
    fallbacks: Vec<String>,
}

impl EndpointRotation {
    /// Blank entries are dropped; the first remaining one is primary
    pub fn new<I, S>(endpoints: I) -> Result<Self, EmptyEndpointList>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cleaned = endpoints
            .into_iter()
            .map(Into::into)
            .map(|e: String| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let primary = cleaned.next().ok_or(EmptyEndpointList)?;
        let mut fallbacks: Vec<String> = Vec::new();
        for endpoint in cleaned {
            if endpoint != primary && !fallbacks.contains(&endpoint) {
                fallbacks.push(endpoint);
            }
        }

        Ok(Self { primary, fallbacks })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        1 + self.fallbacks.len()
    }

    /// Run `operation` against each endpoint in order, each with the full
    /// retry budget. Returns the first success or the last endpoint's error.
    pub async fn run<F, Fut, T, E, P>(
        &self,
        policy: &RetryPolicy,
        label: &str,
        operation: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut result = policy
            .run(label, || operation(self.primary.clone()), &is_retryable)
            .await;

        for next in &self.fallbacks {
            match result {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} exhausted retries ({}), failing over to {}", label, e, next);
                    result = policy
                        .run(label, || operation(next.clone()), &is_retryable)
                        .await;
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::adapters::fetch::retry::Backoff;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Backoff::Linear(Duration::from_secs(1)))
    }

    #[test]
    fn test_new_cleans_and_dedupes() {
        let rotation = EndpointRotation::new(vec![
            " https://a.example ",
            "",
            "https://b.example",
            "https://a.example",
        ])
        .unwrap();

        assert_eq!(rotation.primary(), "https://a.example");
        assert_eq!(
            rotation.endpoints().collect::<Vec<_>>(),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(rotation.len(), 2);
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            EndpointRotation::new(Vec::<String>::new()),
            Err(EmptyEndpointList)
        );
        assert_eq!(EndpointRotation::new(vec!["  "]), Err(EmptyEndpointList));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_over_after_budget() {
        let rotation = EndpointRotation::new(vec!["https://a", "https://b"]).unwrap();
        let seen = Mutex::new(Vec::new());

        let result = rotation
            .run(
                &policy(),
                "getTokenSupply",
                |endpoint| {
                    seen.lock().unwrap().push(endpoint.clone());
                    async move {
                        if endpoint == "https://a" {
                            Err("connection refused".to_string())
                        } else {
                            Ok(endpoint)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), "https://b");
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["https://a", "https://a", "https://a", "https://b"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_when_all_fail() {
        let rotation = EndpointRotation::new(vec!["https://a", "https://b"]).unwrap();

        let result: Result<(), String> = rotation
            .run(
                &policy(),
                "getTokenSupply",
                |endpoint| async move { Err(format!("{} down", endpoint)) },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap_err(), "https://b down");
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_success_skips_fallbacks() {
        let rotation = EndpointRotation::new(vec!["https://a", "https://b"]).unwrap();
        let seen = Mutex::new(Vec::new());

        let result = rotation
            .run(
                &policy(),
                "getBalance",
                |endpoint| {
                    seen.lock().unwrap().push(endpoint.clone());
                    async { Ok::<_, String>(1u64) }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
