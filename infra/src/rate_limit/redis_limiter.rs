//! Redis-based sliding-window rate limiter
//!
//! Each key is a sorted set of request timestamps (epoch millis). Trimming,
//! counting and recording run in one Lua script so concurrent API processes
//! cannot over-admit.

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Script};
use std::time::Duration;
use uuid::Uuid;

use pv_core::services::{ClientRateLimiter, RateLimitDecision};

use crate::cache::RedisClient;

// KEYS: window set
// ARGV: now_ms, window_ms, limit, member
// Returns {admitted, remaining_or_retry_ms}
const SLIDING_WINDOW_SCRIPT: &str = r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', now - window)
local count = redis.call('ZCARD', KEYS[1])
if count >= limit then
  local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
  local retry = window
  if oldest[2] then
    retry = tonumber(oldest[2]) + window - now
  end
  return {0, retry}
end
redis.call('ZADD', KEYS[1], now, ARGV[4])
redis.call('PEXPIRE', KEYS[1], window)
return {1, limit - count - 1}
"#;

/// Redis-based implementation of the client rate limiter
pub struct RedisRateLimiter {
    redis_client: RedisClient,
    key_prefix: String,
    script: Script,
}

impl RedisRateLimiter {
    /// Create a new Redis-based rate limiter
    pub fn new(redis_client: RedisClient, key_prefix: impl Into<String>) -> Self {
        Self {
            redis_client,
            key_prefix: key_prefix.into(),
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        }
    }

    fn key(&self, client_key: &str) -> String {
        format!("{}:rate_limit:{}", self.key_prefix, client_key)
    }
}

#[async_trait]
impl ClientRateLimiter for RedisRateLimiter {
    async fn check_and_record(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, String> {
        let mut conn = self.redis_client.connection();
        let now = Utc::now().timestamp_millis();
        // Unique member so two requests in the same millisecond both count
        let member = format!("{}-{}", now, Uuid::new_v4());

        let (admitted, value): (i64, i64) = self
            .script
            .key(self.key(key))
            .arg(now)
            .arg(window.as_millis() as i64)
            .arg(limit)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| format!("Failed to check rate limit: {}", e))?;

        if admitted == 1 {
            Ok(RateLimitDecision::Allowed {
                remaining: value.max(0) as u32,
            })
        } else {
            Ok(RateLimitDecision::Limited {
                retry_after_seconds: ((value.max(0) + 999) / 1000).max(1) as u64,
            })
        }
    }

    async fn reset(&self, key: &str) -> Result<(), String> {
        let mut conn = self.redis_client.connection();
        conn.del::<_, ()>(self.key(key))
            .await
            .map_err(|e| format!("Failed to reset rate limit: {}", e))
    }
}
