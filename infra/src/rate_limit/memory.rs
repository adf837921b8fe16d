//! Process-local sliding-window limiter

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use pv_core::services::{ClientRateLimiter, RateLimitDecision};

/// How often idle keys are swept out of the map
const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Hits {
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl Hits {
    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.stamps.front() {
            if now.duration_since(*oldest) >= self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
    }
}

#[derive(Default)]
struct State {
    keys: HashMap<String, Hits>,
    last_sweep: Option<Instant>,
}

impl State {
    /// Drop every key whose window has fully drained
    fn sweep_idle(&mut self, now: Instant) {
        self.keys.retain(|_, hits| {
            hits.prune(now);
            !hits.stamps.is_empty()
        });
        self.last_sweep = Some(now);
    }
}

/// Keeps the timestamps of admitted requests per key
///
/// Keys are dropped once their window drains, either when the key is next
/// checked or by the periodic idle sweep, so one-off callers do not
/// accumulate.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    state: Mutex<State>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently tracked
    pub async fn tracked_keys(&self) -> usize {
        self.state.lock().await.keys.len()
    }

    async fn check_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitDecision {
        let mut state = self.state.lock().await;

        let sweep_due = state
            .last_sweep
            .map_or(true, |last| now.saturating_duration_since(last) >= IDLE_SWEEP_INTERVAL);
        if sweep_due {
            state.sweep_idle(now);
        }

        let hits = state.keys.entry(key.to_string()).or_insert_with(|| Hits {
            window,
            stamps: VecDeque::new(),
        });
        hits.window = window;
        hits.prune(now);

        if hits.stamps.len() as u32 >= limit {
            let retry_after = hits
                .stamps
                .front()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(window);
            if hits.stamps.is_empty() {
                state.keys.remove(key);
            }
            let millis = retry_after.as_millis() as u64;
            return RateLimitDecision::Limited {
                retry_after_seconds: ((millis + 999) / 1000).max(1),
            };
        }

        hits.stamps.push_back(now);
        RateLimitDecision::Allowed {
            remaining: limit - hits.stamps.len() as u32,
        }
    }
}

#[async_trait]
impl ClientRateLimiter for InMemoryRateLimiter {
    async fn check_and_record(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, String> {
        Ok(self.check_at(key, limit, window, Instant::now()).await)
    }

    async fn reset(&self, key: &str) -> Result<(), String> {
        self.state.lock().await.keys.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);

    #[tokio::test]
    async fn test_limit_per_window() {
        let limiter = InMemoryRateLimiter::new();
        let start = Instant::now();

        for remaining in (0..3).rev() {
            let decision = limiter.check_at("203.0.113.9", 3, WINDOW, start).await;
            assert_eq!(decision, RateLimitDecision::Allowed { remaining });
        }

        let decision = limiter
            .check_at("203.0.113.9", 3, WINDOW, start + Duration::from_secs(60))
            .await;
        assert_eq!(
            decision,
            RateLimitDecision::Limited {
                retry_after_seconds: 840
            }
        );

        // Other addresses are unaffected
        assert!(limiter.check_at("198.51.100.1", 3, WINDOW, start).await.is_allowed());
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = InMemoryRateLimiter::new();
        let start = Instant::now();

        limiter.check_at("ip", 3, WINDOW, start).await;
        limiter.check_at("ip", 3, WINDOW, start + Duration::from_secs(300)).await;
        limiter.check_at("ip", 3, WINDOW, start + Duration::from_secs(600)).await;

        let at = start + Duration::from_secs(899);
        assert!(!limiter.check_at("ip", 3, WINDOW, at).await.is_allowed());

        // The first request leaves the window after 15 minutes
        let at = start + WINDOW;
        assert!(limiter.check_at("ip", 3, WINDOW, at).await.is_allowed());
    }

    #[tokio::test]
    async fn test_limited_requests_are_not_recorded() {
        let limiter = InMemoryRateLimiter::new();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.check_at("ip", 1, WINDOW, start).await;
        }
        assert!(limiter.check_at("ip", 1, WINDOW, start + WINDOW).await.is_allowed());
    }

    #[tokio::test]
    async fn test_drained_keys_are_dropped() {
        let limiter = InMemoryRateLimiter::new();
        let start = Instant::now();

        for i in 0..100 {
            let key = format!("198.51.100.{}", i);
            limiter.check_at(&key, 3, WINDOW, start).await;
        }
        assert_eq!(limiter.tracked_keys().await, 100);

        // One request after every window drained clears the one-off callers
        let later = start + WINDOW + IDLE_SWEEP_INTERVAL;
        assert!(limiter.check_at("203.0.113.9", 3, WINDOW, later).await.is_allowed());
        assert_eq!(limiter.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_keeps_active_keys() {
        let limiter = InMemoryRateLimiter::new();
        let start = Instant::now();

        limiter.check_at("idle", 3, Duration::from_secs(10), start).await;
        limiter.check_at("busy", 3, WINDOW, start).await;

        let later = start + IDLE_SWEEP_INTERVAL;
        limiter.check_at("other", 3, WINDOW, later).await;
        assert_eq!(limiter.tracked_keys().await, 2);

        // The surviving key keeps its count
        let decision = limiter.check_at("busy", 3, WINDOW, later).await;
        assert_eq!(decision, RateLimitDecision::Allowed { remaining: 1 });
    }

    #[tokio::test]
    async fn test_reset() {
        let limiter = InMemoryRateLimiter::new();
        limiter.check_and_record("ip", 1, WINDOW).await.unwrap();
        assert!(!limiter.check_and_record("ip", 1, WINDOW).await.unwrap().is_allowed());

        limiter.reset("ip").await.unwrap();
        assert!(limiter.check_and_record("ip", 1, WINDOW).await.unwrap().is_allowed());
    }
}
