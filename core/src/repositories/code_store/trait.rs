//! Code store trait defining persistence of verification records.
//!
//! A store keeps at most one record per phone number plus an issuance
//! ledger (`phone -> last_issued_at`) that outlives the record. Every
//! operation that reads and writes the same record must be atomic with
//! respect to concurrent callers, including callers in other processes
//! when the backing store is shared.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::VerificationRecord;
use crate::domain::value_objects::PhoneNumber;
use crate::errors::DomainError;

/// Result of [`CodeStore::replace`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The previous record (if any) was dropped and the new one stored
    Replaced,
    /// The ledger shows an issuance inside the cooldown; nothing was written
    Throttled { wait_seconds: u64 },
}

/// Result of [`CodeStore::register_attempt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No record for the number
    Missing,
    /// The attempt was counted; carries the post-increment record
    Counted(VerificationRecord),
    /// The record already reached the attempt limit and was not incremented
    Exhausted(VerificationRecord),
}

/// Seconds left of a cooldown, rounded up and never zero
pub fn cooldown_wait_seconds(
    last_issued_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<u64> {
    let remaining = last_issued_at + cooldown - now;
    let millis = remaining.num_milliseconds();
    if millis <= 0 {
        None
    } else {
        Some(((millis + 999) / 1000) as u64)
    }
}

#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Look up the live record for a number
    ///
    /// Expiry is not filtered here; callers re-check `expires_at`.
    async fn find(&self, phone: &PhoneNumber) -> Result<Option<VerificationRecord>, DomainError>;

    /// Atomically drop any existing record and store `record`
    ///
    /// The ledger entry for the number is set to `record.created_at` as part
    /// of the same step. With `Some(cooldown)`, the write only happens when
    /// the ledger is older than `cooldown` relative to `record.created_at`;
    /// otherwise [`ReplaceOutcome::Throttled`] is returned and nothing changes.
    async fn replace(
        &self,
        record: VerificationRecord,
        cooldown: Option<Duration>,
    ) -> Result<ReplaceOutcome, DomainError>;

    /// Remove the record for a number; the ledger is kept
    async fn delete(&self, phone: &PhoneNumber) -> Result<(), DomainError>;

    /// Remove the record only while it is still the issuance `record` was
    /// read from, matched on `created_at` and `code`
    ///
    /// Returns `false` when a newer issuance replaced it, which is left alone.
    async fn delete_if_current(&self, record: &VerificationRecord) -> Result<bool, DomainError>;

    /// Atomically check the attempt limit and count one attempt
    async fn register_attempt(
        &self,
        phone: &PhoneNumber,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, DomainError>;

    /// Most recent issuance time from the ledger
    async fn last_issued_at(&self, phone: &PhoneNumber) -> Result<Option<DateTime<Utc>>, DomainError>;

    /// Reclaim records expired at `now`; returns how many were removed
    ///
    /// Stores with native expiry may return `Ok(0)`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
