//! Per-client admission limiting

use async_trait::async_trait;
use std::time::Duration;

/// Decision for one admission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted and recorded
    Allowed { remaining: u32 },
    /// Quota used up; the oldest request leaves the window after this many seconds
    Limited { retry_after_seconds: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Sliding-window rate limiter keyed by an arbitrary client key (usually an IP address)
#[async_trait]
pub trait ClientRateLimiter: Send + Sync {
    /// Check the window for `key` and, if under `limit`, record this request
    ///
    /// Check and record happen as one step so concurrent requests cannot
    /// both take the last slot.
    async fn check_and_record(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, String>;

    /// Forget all recorded requests for `key`
    async fn reset(&self, key: &str) -> Result<(), String>;
}
