//! Identity of the account a phone number is verified for

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier handed over by the identity gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Build an owner id from a header value; blank values are treated as anonymous
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_owner_is_anonymous() {
        assert_eq!(OwnerId::parse("   "), None);
        assert_eq!(OwnerId::parse(" user-42 ").unwrap().as_str(), "user-42");
    }
}
