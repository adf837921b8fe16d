//! Process-local code store

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

use pv_core::domain::{PhoneNumber, VerificationRecord};
use pv_core::errors::DomainError;
use pv_core::repositories::{cooldown_wait_seconds, AttemptOutcome, CodeStore, ReplaceOutcome};

#[derive(Default)]
struct State {
    records: HashMap<PhoneNumber, VerificationRecord>,
    /// Records ordered by expiry, so purging never scans live entries
    expiry_index: BTreeSet<(DateTime<Utc>, PhoneNumber)>,
    ledger: HashMap<PhoneNumber, DateTime<Utc>>,
}

impl State {
    fn remove_record(&mut self, phone: &PhoneNumber) -> Option<VerificationRecord> {
        let record = self.records.remove(phone)?;
        self.expiry_index.remove(&(record.expires_at, phone.clone()));
        Some(record)
    }
}

/// Code store backed by a single mutex-guarded map
///
/// Every operation takes the lock once, which makes replace and
/// register-attempt atomic within the process. Not shared across processes.
pub struct InMemoryCodeStore {
    state: Mutex<State>,
    /// How long ledger entries are kept after issuance
    ledger_retention: Duration,
}

impl InMemoryCodeStore {
    pub fn new(ledger_retention: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            ledger_retention,
        }
    }

    /// Number of records currently held, expired or not
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryCodeStore {
    fn default() -> Self {
        Self::new(Duration::seconds(pv_core::domain::DEFAULT_RESEND_COOLDOWN_SECONDS))
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn find(&self, phone: &PhoneNumber) -> Result<Option<VerificationRecord>, DomainError> {
        Ok(self.state.lock().await.records.get(phone).cloned())
    }

    async fn replace(
        &self,
        record: VerificationRecord,
        cooldown: Option<Duration>,
    ) -> Result<ReplaceOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let phone = record.phone_number.clone();

        if let (Some(cooldown), Some(last)) = (cooldown, state.ledger.get(&phone)) {
            if let Some(wait_seconds) = cooldown_wait_seconds(*last, record.created_at, cooldown) {
                return Ok(ReplaceOutcome::Throttled { wait_seconds });
            }
        }

        state.remove_record(&phone);
        state.ledger.insert(phone.clone(), record.created_at);
        state.expiry_index.insert((record.expires_at, phone.clone()));
        state.records.insert(phone, record);
        Ok(ReplaceOutcome::Replaced)
    }

    async fn delete(&self, phone: &PhoneNumber) -> Result<(), DomainError> {
        self.state.lock().await.remove_record(phone);
        Ok(())
    }

    async fn delete_if_current(&self, record: &VerificationRecord) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        let current = state
            .records
            .get(&record.phone_number)
            .is_some_and(|stored| stored.same_issuance(record));
        if current {
            state.remove_record(&record.phone_number);
        }
        Ok(current)
    }

    async fn register_attempt(
        &self,
        phone: &PhoneNumber,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, DomainError> {
        let mut state = self.state.lock().await;
        Ok(match state.records.get_mut(phone) {
            None => AttemptOutcome::Missing,
            Some(record) if record.is_exhausted(max_attempts) => {
                AttemptOutcome::Exhausted(record.clone())
            }
            Some(record) => {
                record.attempts += 1;
                AttemptOutcome::Counted(record.clone())
            }
        })
    }

    async fn last_issued_at(&self, phone: &PhoneNumber) -> Result<Option<DateTime<Utc>>, DomainError> {
        Ok(self.state.lock().await.ledger.get(phone).copied())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut state = self.state.lock().await;

        let mut purged = 0;
        while let Some((expires_at, phone)) = state.expiry_index.first().cloned() {
            if expires_at > now {
                break;
            }
            state.expiry_index.pop_first();
            if state.records.remove(&phone).is_some() {
                purged += 1;
            }
        }

        let horizon = now - self.ledger_retention;
        state.ledger.retain(|_, issued_at| *issued_at > horizon);

        if purged > 0 {
            debug!(purged = purged, event = "otp_purged", "Purged expired verification records");
        }
        Ok(purged)
    }
}
