//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Code store backend and Redis connection
//! - `delivery` - Delivery provider and Twilio credentials
//! - `directory` - User directory backend and database connection
//! - `environment` - Environment detection and logging configuration
//! - `identity` - How the caller identity is read from gateway headers
//! - `rate_limit` - Per-address admission limits and resend cooldown
//! - `server` - HTTP server and CORS configuration
//! - `verification` - Code lifetime and attempt budget

pub mod cache;
pub mod delivery;
pub mod directory;
pub mod environment;
pub mod identity;
pub mod rate_limit;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::{CacheConfig, StoreBackend};
pub use delivery::{DeliveryConfig, DeliveryProvider, TwilioSettings};
pub use directory::{DirectoryBackend, DirectoryConfig};
pub use environment::{Environment, LoggingConfig};
pub use identity::IdentityConfig;
pub use rate_limit::RateLimitConfig;
pub use server::{CorsConfig, ServerConfig};
pub use verification::VerificationConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Verification code policy
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Code store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Delivery channel configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// User directory configuration
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Caller identity configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Create configuration for development environment
    ///
    /// Everything runs in-process: memory store, memory directory, logging channel.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8080),
            verification: VerificationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            delivery: DeliveryConfig::default(),
            directory: DirectoryConfig::default(),
            identity: IdentityConfig::default(),
            cors: CorsConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            verification: VerificationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::redis("redis://localhost:6379"),
            delivery: DeliveryConfig::twilio(),
            directory: DirectoryConfig::mysql("mysql://localhost:3306/replyly"),
            identity: IdentityConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Create the preset for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Load the preset matching the `ENVIRONMENT` variable
    pub fn from_env() -> Self {
        Self::for_environment(Environment::from_env())
    }

    /// Check the combination of settings for contradictions
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() && self.verification.expose_code_in_response {
            return Err("verification.expose_code_in_response must be disabled in production".to_string());
        }
        if self.verification.max_attempts == 0 {
            return Err("verification.max_attempts must be at least 1".to_string());
        }
        if self.rate_limit.issue_per_address == 0 {
            return Err("rate_limit.issue_per_address must be at least 1".to_string());
        }
        if self.delivery.provider == DeliveryProvider::Twilio {
            self.delivery.twilio.validate()?;
        }
        Ok(())
    }
}
