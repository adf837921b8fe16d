//! Delivery channel configuration module

use serde::{Deserialize, Serialize};

/// Provider used to deliver codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryProvider {
    /// Log messages instead of sending them (development)
    #[default]
    Mock,
    /// Twilio Programmable Messaging (SMS and WhatsApp)
    Twilio,
}

/// Delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Selected provider
    pub provider: DeliveryProvider,

    /// Twilio credentials, used when `provider = "twilio"`
    pub twilio: TwilioSettings,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            provider: DeliveryProvider::Mock,
            twilio: TwilioSettings::default(),
        }
    }
}

impl DeliveryConfig {
    /// Twilio delivery with credentials from `TWILIO_*` variables
    pub fn twilio() -> Self {
        Self {
            provider: DeliveryProvider::Twilio,
            twilio: TwilioSettings::from_env(),
        }
    }
}

/// Twilio account settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TwilioSettings {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// Sender number in E.164 format, without any transport prefix
    pub from_number: String,
    /// API base URL
    pub api_base_url: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl Default for TwilioSettings {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            api_base_url: String::from("https://api.twilio.com"),
            request_timeout_secs: 10,
        }
    }
}

impl TwilioSettings {
    /// Read credentials from environment variables, leaving missing ones empty
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            from_number: std::env::var("TWILIO_FROM_NUMBER").unwrap_or_default(),
            api_base_url: std::env::var("TWILIO_API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_secs: std::env::var("TWILIO_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Check that the credentials are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.account_sid.is_empty() {
            return Err("TWILIO_ACCOUNT_SID not set".to_string());
        }
        if self.auth_token.is_empty() {
            return Err("TWILIO_AUTH_TOKEN not set".to_string());
        }
        if !self.from_number.starts_with('+') {
            return Err("TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("Twilio request timeout must be positive".to_string());
        }
        Ok(())
    }
}
