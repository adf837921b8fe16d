//! Traits for delivery integration

use async_trait::async_trait;

use crate::domain::value_objects::{PhoneNumber, Transport};

/// Trait for code delivery integration
///
/// Implementations render the standard message, address it for the
/// transport and hand it to a provider. No retries happen here.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver a code; returns the provider's message id or an opaque error
    async fn send_code(
        &self,
        destination: &PhoneNumber,
        code: &str,
        transport: Transport,
    ) -> Result<String, String>;
}
