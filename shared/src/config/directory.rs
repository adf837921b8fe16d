//! User directory configuration module

use serde::{Deserialize, Serialize};

/// Where phone ownership is looked up and recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    /// Process-local map (development and tests)
    #[default]
    Memory,
    /// The users table of the main application database
    Mysql,
}

/// User directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Selected backend
    pub backend: DirectoryBackend,

    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::Memory,
            url: String::from("mysql://localhost:3306/replyly"),
            max_connections: 5,
            connect_timeout: 10,
        }
    }
}

impl DirectoryConfig {
    /// Create a MySQL-backed configuration
    pub fn mysql(url: impl Into<String>) -> Self {
        Self {
            backend: DirectoryBackend::Mysql,
            url: url.into(),
            ..Default::default()
        }
    }
}
