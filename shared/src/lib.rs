//! Shared utilities and common types for the phone verification server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (phone normalisation, masking)
//! - API response envelopes

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CorsConfig, DeliveryConfig, DeliveryProvider, DirectoryBackend,
    DirectoryConfig, Environment, IdentityConfig, LoggingConfig, RateLimitConfig,
    ServerConfig, StoreBackend, TwilioSettings, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{ApiResponse, HealthResponse, HealthStatus};
pub use utils::phone;
