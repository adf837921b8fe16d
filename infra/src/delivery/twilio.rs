//! Twilio Messages API channel
//!
//! Sends one form-encoded POST per code to
//! `{api_base_url}/2010-04-01/Accounts/{sid}/Messages.json` with basic auth.
//! There is no retry loop: a failed or timed-out request is reported to the
//! caller, who can ask for a resend.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

use pv_core::domain::{verification_message, PhoneNumber, Transport};
use pv_core::services::DeliveryChannel;
use pv_shared::phone::mask_phone_number;
use pv_shared::TwilioSettings;

use crate::InfrastructureError;

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

/// Delivery channel backed by the Twilio REST API
pub struct TwilioDeliveryChannel {
    client: Client,
    settings: TwilioSettings,
    validity_minutes: i64,
}

impl TwilioDeliveryChannel {
    /// Build the channel; fails on incomplete credentials
    pub fn new(settings: TwilioSettings, validity_minutes: i64) -> Result<Self, InfrastructureError> {
        settings.validate().map_err(InfrastructureError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        info!(
            "Twilio delivery channel initialized with from number: {}",
            mask_phone_number(&settings.from_number)
        );

        Ok(Self {
            client,
            settings,
            validity_minutes,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.account_sid
        )
    }

    async fn post_message(&self, to: &str, from: &str, body: &str) -> Result<String, InfrastructureError> {
        let params = [("To", to), ("From", from), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InfrastructureError::Delivery("Twilio request timed out".to_string())
                } else {
                    InfrastructureError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let message: MessageResponse = response.json().await?;
            return Ok(message.sid);
        }

        let detail = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                code: Some(code),
                message: Some(message),
            }) => format!("{} (code {})", message, code),
            Ok(ErrorResponse {
                message: Some(message),
                ..
            }) => message,
            _ => "Unknown error".to_string(),
        };
        Err(InfrastructureError::Delivery(format!(
            "Twilio returned {}: {}",
            status.as_u16(),
            detail
        )))
    }
}

#[async_trait]
impl DeliveryChannel for TwilioDeliveryChannel {
    async fn send_code(
        &self,
        destination: &PhoneNumber,
        code: &str,
        transport: Transport,
    ) -> Result<String, String> {
        let to = transport.destination(destination);
        let from = transport.address(&self.settings.from_number);
        let body = verification_message(code, self.validity_minutes);

        match self.post_message(&to, &from, &body).await {
            Ok(sid) => {
                info!(
                    provider = "twilio",
                    phone = %destination.masked(),
                    transport = %transport,
                    message_id = %sid,
                    "Verification message accepted by provider"
                );
                Ok(sid)
            }
            Err(e) => {
                error!(
                    provider = "twilio",
                    phone = %destination.masked(),
                    transport = %transport,
                    error = %e,
                    "Failed to send verification message"
                );
                Err(e.to_string())
            }
        }
    }
}
