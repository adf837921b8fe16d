//! Main verification service implementation

use chrono::Duration;
use std::sync::Arc;

use crate::domain::entities::VerificationRecord;
use crate::domain::value_objects::{OwnerId, PhoneNumber, Transport};
use crate::errors::{DomainError, DomainResult, VerificationError};
use crate::repositories::{cooldown_wait_seconds, AttemptOutcome, CodeStore, ReplaceOutcome, UserDirectory};
use crate::services::clock::{Clock, SystemClock};

use super::config::VerificationServiceConfig;
use super::traits::DeliveryChannel;
use super::types::{IssueCodeResult, ValidateCodeResult};

/// Verification service for issuing and validating one-time codes
///
/// The service is the only place business rules live. Stores and channels
/// are plain I/O; every decision about expiry, attempts, cooldown and
/// ownership is taken here against the record the store hands back.
pub struct VerificationService {
    /// Persistence for the one live record per number
    store: Arc<dyn CodeStore>,
    /// Transport to the user's handset
    delivery: Arc<dyn DeliveryChannel>,
    /// External owner of phone/identity bindings
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl VerificationService {
    /// Create a new verification service on the wall clock
    ///
    /// # Arguments
    ///
    /// * `store` - Code store implementation
    /// * `delivery` - Delivery channel implementation
    /// * `directory` - User directory collaborator
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<dyn CodeStore>,
        delivery: Arc<dyn DeliveryChannel>,
        directory: Arc<dyn UserDirectory>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self::with_clock(store, delivery, directory, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        store: Arc<dyn CodeStore>,
        delivery: Arc<dyn DeliveryChannel>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            store,
            delivery,
            directory,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a code to a phone number
    ///
    /// This method:
    /// 1. Normalises and validates the phone number
    /// 2. Rejects numbers verified under another identity
    /// 3. Atomically replaces any existing record with a fresh one
    /// 4. Sends the code over the requested transport
    ///
    /// A delivery failure leaves the new record in place and returns
    /// `DomainError::DeliveryFailed`; the caller may resend.
    pub async fn issue_code(
        &self,
        phone_input: &str,
        transport: Transport,
        owner: Option<&OwnerId>,
    ) -> DomainResult<IssueCodeResult> {
        let phone = Self::parse_phone(phone_input)?;
        self.issue_for(phone, transport, owner, None).await
    }

    /// Re-issue a code, subject to the per-number cooldown
    ///
    /// The ledger is consulted first so throttled callers fail fast; the
    /// authoritative check is folded into the store's atomic replace so two
    /// concurrent resends cannot both get through.
    pub async fn resend_code(
        &self,
        phone_input: &str,
        transport: Transport,
        owner: Option<&OwnerId>,
    ) -> DomainResult<IssueCodeResult> {
        let phone = Self::parse_phone(phone_input)?;
        let cooldown = self.config.resend_cooldown();

        let last_issued_at = self
            .store
            .last_issued_at(&phone)
            .await
            .map_err(|e| Self::log_fault(&phone, "ledger_lookup_failed", e))?;

        if let Some(last) = last_issued_at {
            if let Some(wait_seconds) = cooldown_wait_seconds(last, self.clock.now(), cooldown) {
                return Err(Self::throttled(&phone, wait_seconds));
            }
        }

        self.issue_for(phone, transport, owner, Some(cooldown)).await
    }

    /// Validate a submitted code
    ///
    /// The attempt is counted in the store before the comparison, so
    /// concurrent wrong guesses can never push `attempts` past the limit.
    /// On success the number is bound to the record's owner (or the caller)
    /// in the user directory and the record is deleted.
    pub async fn validate_code(
        &self,
        phone_input: &str,
        submitted_code: &str,
        caller: Option<&OwnerId>,
    ) -> DomainResult<ValidateCodeResult> {
        let phone = Self::parse_phone(phone_input)?;
        let max_attempts = self.config.max_attempts;
        let now = self.clock.now();

        let record = self
            .store
            .find(&phone)
            .await
            .map_err(|e| Self::log_fault(&phone, "otp_lookup_failed", e))?
            .ok_or_else(|| Self::outcome(&phone, "otp_not_found", VerificationError::NotFound))?;

        if record.is_expired_at(now) {
            self.discard(&record).await?;
            return Err(Self::outcome(&phone, "otp_expired", VerificationError::Expired));
        }
        if record.is_exhausted(max_attempts) {
            self.discard(&record).await?;
            return Err(Self::outcome(&phone, "otp_exhausted", VerificationError::Exhausted));
        }

        let record = match self
            .store
            .register_attempt(&phone, max_attempts)
            .await
            .map_err(|e| Self::log_fault(&phone, "otp_attempt_failed", e))?
        {
            AttemptOutcome::Counted(record) => record,
            AttemptOutcome::Missing => {
                return Err(Self::outcome(&phone, "otp_not_found", VerificationError::NotFound));
            }
            AttemptOutcome::Exhausted(record) => {
                self.discard(&record).await?;
                return Err(Self::outcome(&phone, "otp_exhausted", VerificationError::Exhausted));
            }
        };

        // The counted record may belong to a superseding issuance
        if record.is_expired_at(now) {
            self.discard(&record).await?;
            return Err(Self::outcome(&phone, "otp_expired", VerificationError::Expired));
        }

        if !record.matches(submitted_code) {
            if record.is_exhausted(max_attempts) {
                self.discard(&record).await?;
                return Err(Self::outcome(&phone, "otp_exhausted", VerificationError::Exhausted));
            }
            let remaining_attempts = record.remaining_attempts(max_attempts);
            tracing::warn!(
                phone = %phone.masked(),
                attempts = record.attempts,
                remaining_attempts = remaining_attempts,
                event = "otp_incorrect",
                "Incorrect verification code submitted"
            );
            return Err(VerificationError::Incorrect { remaining_attempts }.into());
        }

        let owner = record.owner_id.clone().or_else(|| caller.cloned());
        self.confirm_ownership(&record, owner.as_ref()).await?;

        let mut record = record;
        record.verified = true;

        if let Some(owner) = owner.as_ref() {
            if let Err(e) = self.directory.mark_phone_verified(owner, &phone, now).await {
                if e.is_expected() {
                    self.discard(&record).await?;
                    tracing::warn!(
                        phone = %phone.masked(),
                        event = "phone_claimed_concurrently",
                        "Phone number was verified by another account while marking"
                    );
                    return Err(e);
                }
                return Err(Self::log_fault(&phone, "directory_update_failed", e));
            }
        }

        self.discard(&record).await?;

        tracing::info!(
            phone = %phone.masked(),
            transport = %record.transport,
            attempts = record.attempts,
            anonymous = owner.is_none(),
            event = "otp_verified",
            "Phone number verified"
        );

        Ok(ValidateCodeResult {
            phone_number: phone,
            owner_id: owner,
            verified_at: now,
        })
    }

    async fn issue_for(
        &self,
        phone: PhoneNumber,
        transport: Transport,
        owner: Option<&OwnerId>,
        cooldown: Option<Duration>,
    ) -> DomainResult<IssueCodeResult> {
        self.ensure_issuable(&phone, owner).await?;

        let now = self.clock.now();
        let record = VerificationRecord::issue(
            phone.clone(),
            owner.cloned(),
            transport,
            now,
            self.config.code_ttl(),
        );
        let code = record.code.clone();
        let expires_at = record.expires_at;

        match self
            .store
            .replace(record, cooldown)
            .await
            .map_err(|e| Self::log_fault(&phone, "otp_storage_failed", e))?
        {
            ReplaceOutcome::Replaced => {}
            ReplaceOutcome::Throttled { wait_seconds } => {
                return Err(Self::throttled(&phone, wait_seconds));
            }
        }

        tracing::info!(
            phone = %phone.masked(),
            transport = %transport,
            resend = cooldown.is_some(),
            event = "otp_generated",
            "Generated new verification code"
        );

        let message_id = self
            .delivery
            .send_code(&phone, &code, transport)
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %phone.masked(),
                    transport = %transport,
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code"
                );
                DomainError::DeliveryFailed { message: e }
            })?;

        tracing::info!(
            phone = %phone.masked(),
            transport = %transport,
            message_id = %message_id,
            event = "otp_sent",
            "Verification code sent"
        );

        Ok(IssueCodeResult {
            phone_number: phone,
            message_id,
            transport,
            expires_at,
            next_resend_at: now + self.config.resend_cooldown(),
            code: self.config.expose_code.then_some(code),
        })
    }

    /// Issuance is refused when another identity already holds the number;
    /// anonymous issuance is refused when anyone does
    async fn ensure_issuable(&self, phone: &PhoneNumber, owner: Option<&OwnerId>) -> DomainResult<()> {
        let existing = self
            .directory
            .lookup_verified_owner(phone)
            .await
            .map_err(|e| Self::log_fault(phone, "directory_lookup_failed", e))?;

        match existing {
            Some(existing) if owner != Some(&existing) => Err(Self::outcome(
                phone,
                "phone_already_registered",
                VerificationError::PhoneAlreadyRegistered,
            )),
            _ => Ok(()),
        }
    }

    /// Re-check ownership right before binding, deleting the record on conflict
    async fn confirm_ownership(&self, record: &VerificationRecord, owner: Option<&OwnerId>) -> DomainResult<()> {
        if let Err(e) = self.ensure_issuable(&record.phone_number, owner).await {
            if e.is_expected() {
                self.discard(record).await?;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Delete the record this validation read; a code issued meanwhile survives
    async fn discard(&self, record: &VerificationRecord) -> DomainResult<()> {
        let removed = self
            .store
            .delete_if_current(record)
            .await
            .map_err(|e| Self::log_fault(&record.phone_number, "otp_delete_failed", e))?;
        if !removed {
            tracing::debug!(
                phone = %record.phone_number.masked(),
                event = "otp_superseded",
                "Verification record was replaced by a newer issuance; keeping it"
            );
        }
        Ok(())
    }

    fn parse_phone(input: &str) -> DomainResult<PhoneNumber> {
        PhoneNumber::parse(input).map_err(|e| {
            tracing::info!(event = "invalid_phone_format", "Rejected malformed phone number");
            e.into()
        })
    }

    fn throttled(phone: &PhoneNumber, wait_seconds: u64) -> DomainError {
        tracing::warn!(
            phone = %phone.masked(),
            wait_seconds = wait_seconds,
            event = "resend_throttled",
            "Verification code requested inside the resend cooldown"
        );
        VerificationError::Throttled { wait_seconds }.into()
    }

    fn outcome(phone: &PhoneNumber, event: &'static str, error: VerificationError) -> DomainError {
        tracing::info!(phone = %phone.masked(), event = event, "{}", error);
        error.into()
    }

    fn log_fault(phone: &PhoneNumber, event: &'static str, error: DomainError) -> DomainError {
        if error.is_expected() {
            return error;
        }
        tracing::error!(phone = %phone.masked(), error = %error, event = event, "Verification store or directory failure");
        error
    }
}
