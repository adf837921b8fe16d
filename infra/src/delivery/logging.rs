//! Logging delivery channel for development and testing
//!
//! Nothing leaves the process. Messages are logged with the phone number
//! masked and the body omitted; the full content is only available to tests
//! through [`LoggingDeliveryChannel::last_message`].

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use pv_core::domain::{verification_message, PhoneNumber, Transport};
use pv_core::services::DeliveryChannel;

/// A message the channel would have sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    pub to: String,
    pub body: String,
    pub transport: Transport,
    pub message_id: String,
}

/// Delivery channel that logs instead of sending
#[derive(Clone)]
pub struct LoggingDeliveryChannel {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures (for testing)
    simulate_failure: Arc<AtomicBool>,
    last_message: Arc<Mutex<Option<LoggedMessage>>>,
    validity_minutes: i64,
}

impl LoggingDeliveryChannel {
    pub fn new(validity_minutes: i64) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(false)),
            last_message: Arc::new(Mutex::new(None)),
            validity_minutes,
        }
    }

    /// Get the total number of messages sent
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    pub fn last_message(&self) -> Option<LoggedMessage> {
        self.last_message
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The code contained in the most recent message
    pub fn last_code(&self) -> Option<String> {
        let body = self.last_message()?.body;
        body.split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == pv_core::domain::CODE_LENGTH)
            .map(str::to_string)
    }
}

impl Default for LoggingDeliveryChannel {
    fn default() -> Self {
        Self::new(pv_core::domain::DEFAULT_CODE_TTL_SECONDS / 60)
    }
}

#[async_trait]
impl DeliveryChannel for LoggingDeliveryChannel {
    async fn send_code(
        &self,
        destination: &PhoneNumber,
        code: &str,
        transport: Transport,
    ) -> Result<String, String> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                provider = "logging",
                phone = %destination.masked(),
                "Logging channel simulating failure"
            );
            return Err("Simulated delivery failure".to_string());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            provider = "logging",
            phone = %destination.masked(),
            transport = %transport,
            message_id = %message_id,
            count = count,
            "Verification message logged instead of sent"
        );

        *self.last_message.lock().unwrap_or_else(|e| e.into_inner()) = Some(LoggedMessage {
            to: transport.destination(destination),
            body: verification_message(code, self.validity_minutes),
            transport,
            message_id: message_id.clone(),
        });

        Ok(message_id)
    }
}
