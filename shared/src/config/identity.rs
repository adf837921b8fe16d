//! Caller identity configuration
//!
//! Authentication happens at the identity gateway in front of this service;
//! the gateway forwards the authenticated user id in a request header.

use serde::{Deserialize, Serialize};

/// Header carrying the caller identity
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Name of the header set by the gateway
    pub header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header: String::from("X-User-Id"),
        }
    }
}
