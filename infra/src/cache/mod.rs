//! Cache module for verification record storage
//!
//! Provides the in-memory code store used in development and tests, the
//! Redis code store used when several API processes share state, and the
//! background sweeper that reclaims expired records.

pub mod memory_store;
#[cfg(feature = "redis-cache")]
pub mod redis_client;
#[cfg(feature = "redis-cache")]
pub mod redis_store;
pub mod sweeper;


pub use memory_store::InMemoryCodeStore;
#[cfg(feature = "redis-cache")]
pub use redis_client::RedisClient;
#[cfg(feature = "redis-cache")]
pub use redis_store::RedisCodeStore;
pub use sweeper::spawn_expiry_sweeper;

// Re-export commonly used types
pub use pv_shared::config::CacheConfig;
