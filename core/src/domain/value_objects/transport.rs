//! Delivery transports

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::phone_number::PhoneNumber;

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Closed set of transports a code can be delivered over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Sms,
    #[serde(rename = "whatsapp")]
    WhatsApp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Sms => "sms",
            Transport::WhatsApp => "whatsapp",
        }
    }

    /// Provider address for a number on this transport
    ///
    /// WhatsApp addresses carry a `whatsapp:` prefix; applying it twice is a no-op.
    pub fn address(&self, raw: &str) -> String {
        match self {
            Transport::Sms => raw.to_string(),
            Transport::WhatsApp if raw.starts_with(WHATSAPP_PREFIX) => raw.to_string(),
            Transport::WhatsApp => format!("{}{}", WHATSAPP_PREFIX, raw),
        }
    }

    pub fn destination(&self, phone: &PhoneNumber) -> String {
        self.address(phone.as_str())
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sms" => Ok(Transport::Sms),
            "whatsapp" => Ok(Transport::WhatsApp),
            other => Err(format!("Unsupported channel: {}", other)),
        }
    }
}
