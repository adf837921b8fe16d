//! Code store configuration module

use serde::{Deserialize, Serialize};

/// Where verification records and rate-limit windows live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps, lost on restart
    #[default]
    Memory,
    /// Shared Redis instance
    Redis,
}

/// Code store and Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Selected backend
    pub backend: StoreBackend,

    /// Redis connection URL
    pub url: String,

    /// Prefix prepended to every Redis key
    pub key_prefix: String,

    /// Interval of the in-memory expiry sweep in seconds
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: String::from("redis://localhost:6379"),
            key_prefix: String::from("pv"),
            sweep_interval_seconds: 60,
        }
    }
}

impl CacheConfig {
    /// Create a Redis-backed configuration
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: StoreBackend::Redis,
            url: url.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_deserialization() {
        let config: CacheConfig = serde_json::from_str(r#"{"backend": "redis"}"#).unwrap();
        assert_eq!(config.backend, StoreBackend::Redis);
        assert_eq!(config.key_prefix, "pv");
    }
}
