//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborator traits defined in `pv_core`:
//!
//! - **Cache**: in-memory and Redis code stores, plus the expiry sweeper
//! - **Rate limiting**: in-memory and Redis sliding-window client limiters
//! - **Delivery**: Twilio Messages API channel and a logging channel for development
//! - **Directory**: in-memory and MySQL user directories
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL user directory (default)
//! - `redis-cache`: Enable the Redis code store and rate limiter (default)

use pv_core::errors::DomainError;

/// Cache module - code stores and expiry sweeping
pub mod cache;

/// Delivery module - outbound message providers
pub mod delivery;

/// Directory module - phone ownership lookups
pub mod directory;

/// Rate limiting module - per-client admission windows
pub mod rate_limit;

pub use cache::{spawn_expiry_sweeper, InMemoryCodeStore};
#[cfg(feature = "redis-cache")]
pub use cache::{RedisClient, RedisCodeStore};
pub use delivery::{LoggingDeliveryChannel, TwilioDeliveryChannel};
pub use directory::InMemoryUserDirectory;
#[cfg(feature = "mysql")]
pub use directory::MySqlUserDirectory;
pub use rate_limit::InMemoryRateLimiter;
#[cfg(feature = "redis-cache")]
pub use rate_limit::RedisRateLimiter;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Delivery provider error
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Internal {
            message: error.to_string(),
        }
    }
}
