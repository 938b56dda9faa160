//! Shared fetch plumbing: rate limiting, retry and endpoint failover

pub mod rate_limiter;
pub mod retry;
pub mod endpoints;

pub use rate_limiter::{
    backoff_delay, message_indicates_rate_limit, RateLimitConfig, RateLimitSignal,
    RateLimitState, RateLimitedFetcher, RATE_LIMIT_RPC_CODES,
};
pub use retry::{Backoff, RetryPolicy};
pub use endpoints::{EmptyEndpointList, EndpointRotation};
