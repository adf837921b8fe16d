//! Sliding-window client rate limiters

pub mod memory;
#[cfg(feature = "redis-cache")]
pub mod redis_limiter;

pub use memory::InMemoryRateLimiter;
#[cfg(feature = "redis-cache")]
pub use redis_limiter::RedisRateLimiter;
