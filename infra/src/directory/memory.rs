//! In-memory user directory for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use pv_core::domain::{OwnerId, PhoneNumber};
use pv_core::errors::{DomainError, VerificationError};
use pv_core::repositories::UserDirectory;

/// Phone bindings held in a map; an owner keeps at most one number
#[derive(Default)]
pub struct InMemoryUserDirectory {
    bindings: RwLock<HashMap<PhoneNumber, (OwnerId, DateTime<Utc>)>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with one binding
    pub fn with_binding(phone: PhoneNumber, owner: OwnerId) -> Self {
        let bindings = HashMap::from([(phone, (owner, Utc::now()))]);
        Self {
            bindings: RwLock::new(bindings),
        }
    }

    /// The number currently bound to `owner`, if any
    pub async fn phone_of(&self, owner: &OwnerId) -> Option<PhoneNumber> {
        self.bindings
            .read()
            .await
            .iter()
            .find(|(_, (o, _))| o == owner)
            .map(|(phone, _)| phone.clone())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup_verified_owner(&self, phone: &PhoneNumber) -> Result<Option<OwnerId>, DomainError> {
        Ok(self
            .bindings
            .read()
            .await
            .get(phone)
            .map(|(owner, _)| owner.clone()))
    }

    async fn mark_phone_verified(
        &self,
        owner: &OwnerId,
        phone: &PhoneNumber,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut bindings = self.bindings.write().await;

        if let Some((existing, _)) = bindings.get(phone) {
            if existing != owner {
                return Err(VerificationError::PhoneAlreadyRegistered.into());
            }
        }

        bindings.retain(|p, (o, _)| o != owner || p == phone);
        bindings.insert(phone.clone(), (owner.clone(), at));

        info!(
            phone = %phone.masked(),
            event = "phone_marked_verified",
            "Phone number bound to account"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(raw: &str) -> PhoneNumber {
        PhoneNumber::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_mark_and_lookup() {
        let directory = InMemoryUserDirectory::new();
        let owner = OwnerId::from("user-1");
        let number = phone("+15551234567");

        assert_eq!(directory.lookup_verified_owner(&number).await.unwrap(), None);
        directory.mark_phone_verified(&owner, &number, Utc::now()).await.unwrap();
        assert_eq!(directory.lookup_verified_owner(&number).await.unwrap(), Some(owner.clone()));

        // Re-verifying the same binding is fine
        directory.mark_phone_verified(&owner, &number, Utc::now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_number_held_by_other_owner() {
        let number = phone("+15551234567");
        let directory = InMemoryUserDirectory::with_binding(number.clone(), OwnerId::from("a"));

        let result = directory
            .mark_phone_verified(&OwnerId::from("b"), &number, Utc::now())
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Verification(VerificationError::PhoneAlreadyRegistered))
        ));
    }

    #[tokio::test]
    async fn test_owner_moves_to_new_number() {
        let directory = InMemoryUserDirectory::new();
        let owner = OwnerId::from("user-1");
        let old = phone("+15551234567");
        let new = phone("+442071838750");

        directory.mark_phone_verified(&owner, &old, Utc::now()).await.unwrap();
        directory.mark_phone_verified(&owner, &new, Utc::now()).await.unwrap();

        assert_eq!(directory.lookup_verified_owner(&old).await.unwrap(), None);
        assert_eq!(directory.phone_of(&owner).await, Some(new));
    }
}
