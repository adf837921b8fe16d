//! User directory collaborator.
//!
//! Profiles live outside this service; verification only needs to know who
//! (if anyone) owns a verified number, and to record a new verification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::value_objects::{OwnerId, PhoneNumber};
use crate::errors::DomainError;

/// Repository trait for phone ownership lookups
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use chrono::{DateTime, Utc};
/// use pv_core::domain::{OwnerId, PhoneNumber};
/// use pv_core::errors::DomainError;
/// use pv_core::repositories::UserDirectory;
///
/// struct NobodyDirectory;
///
/// #[async_trait]
/// impl UserDirectory for NobodyDirectory {
///     async fn lookup_verified_owner(
///         &self,
///         _phone: &PhoneNumber,
///     ) -> Result<Option<OwnerId>, DomainError> {
///         Ok(None)
///     }
///
///     async fn mark_phone_verified(
///         &self,
///         _owner: &OwnerId,
///         _phone: &PhoneNumber,
///         _at: DateTime<Utc>,
///     ) -> Result<(), DomainError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Identity the number is currently verified for, if any
    async fn lookup_verified_owner(&self, phone: &PhoneNumber) -> Result<Option<OwnerId>, DomainError>;

    /// Record that `owner` proved possession of `phone` at `at`
    ///
    /// # Returns
    /// * `Ok(())` - Ownership recorded (idempotent for the same owner)
    /// * `Err(DomainError::Verification(PhoneAlreadyRegistered))` - Another identity holds the number
    /// * `Err(DomainError)` - Storage error
    async fn mark_phone_verified(
        &self,
        owner: &OwnerId,
        phone: &PhoneNumber,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}
