//! Redis-backed code store
//!
//! Key layout (phone numbers are hashed so raw numbers never appear in keys):
//! - `{prefix}:otp:{sha256(phone)}` - hash holding the record, expiring at `expires_at`
//! - `{prefix}:otp_ledger:{sha256(phone)}` - last issuance time in epoch millis
//!
//! Replace, register-attempt and conditional delete run as Lua scripts so
//! they are atomic across every process sharing the Redis instance.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::{AsyncCommands, Script};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use pv_core::domain::{OwnerId, PhoneNumber, Transport, VerificationRecord};
use pv_core::errors::DomainError;
use pv_core::repositories::{AttemptOutcome, CodeStore, ReplaceOutcome};

use crate::cache::RedisClient;
use crate::InfrastructureError;

// KEYS: record, ledger
// ARGV: created_at_ms, cooldown_ms (-1 = none), ledger_ttl_ms, expires_at_ms, field/value pairs...
// Returns 0 when written, otherwise the milliseconds left of the cooldown.
const REPLACE_SCRIPT: &str = r#"
local cooldown = tonumber(ARGV[2])
if cooldown >= 0 then
  local last = redis.call('GET', KEYS[2])
  if last then
    local remaining = tonumber(last) + cooldown - tonumber(ARGV[1])
    if remaining > 0 then
      return remaining
    end
  end
end
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], unpack(ARGV, 5))
redis.call('PEXPIREAT', KEYS[1], ARGV[4])
redis.call('SET', KEYS[2], ARGV[1], 'PX', ARGV[3])
return 0
"#;

// KEYS: record
// ARGV: max_attempts
// Returns {status, field, value, ...}; status 0 = missing, 1 = counted, 2 = exhausted.
const REGISTER_ATTEMPT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return {'0'}
end
local attempts = tonumber(redis.call('HGET', KEYS[1], 'attempts') or '0')
local status = '2'
if attempts < tonumber(ARGV[1]) then
  redis.call('HINCRBY', KEYS[1], 'attempts', 1)
  status = '1'
end
local out = {status}
local fields = redis.call('HGETALL', KEYS[1])
for i = 1, #fields do
  out[#out + 1] = fields[i]
end
return out
"#;

// KEYS: record
// ARGV: created_at_ms, code
// Returns 1 when the record was still that issuance and got deleted, else 0.
const DELETE_IF_CURRENT_SCRIPT: &str = r#"
local stored = redis.call('HMGET', KEYS[1], 'created_at', 'code')
if stored[1] == ARGV[1] and stored[2] == ARGV[2] then
  redis.call('DEL', KEYS[1])
  return 1
end
return 0
"#;

/// Code store shared through Redis
pub struct RedisCodeStore {
    client: RedisClient,
    key_prefix: String,
    ledger_retention: Duration,
    replace_script: Script,
    register_attempt_script: Script,
    delete_if_current_script: Script,
}

impl RedisCodeStore {
    pub fn new(client: RedisClient, key_prefix: impl Into<String>, ledger_retention: Duration) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            ledger_retention,
            replace_script: Script::new(REPLACE_SCRIPT),
            register_attempt_script: Script::new(REGISTER_ATTEMPT_SCRIPT),
            delete_if_current_script: Script::new(DELETE_IF_CURRENT_SCRIPT),
        }
    }

    fn record_key(&self, phone: &PhoneNumber) -> String {
        format!("{}:otp:{}", self.key_prefix, hash_phone(phone))
    }

    fn ledger_key(&self, phone: &PhoneNumber) -> String {
        format!("{}:otp_ledger:{}", self.key_prefix, hash_phone(phone))
    }
}

fn hash_phone(phone: &PhoneNumber) -> String {
    let mut hasher = Sha256::new();
    hasher.update(phone.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Flatten a record into hash fields
pub(crate) fn encode_record(record: &VerificationRecord) -> Vec<(&'static str, String)> {
    vec![
        ("phone", record.phone_number.to_string()),
        ("code", record.code.clone()),
        (
            "owner_id",
            record
                .owner_id
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_default(),
        ),
        ("created_at", record.created_at.timestamp_millis().to_string()),
        ("expires_at", record.expires_at.timestamp_millis().to_string()),
        ("attempts", record.attempts.to_string()),
        ("verified", if record.verified { "1" } else { "0" }.to_string()),
        ("transport", record.transport.as_str().to_string()),
    ]
}

/// Rebuild a record from hash fields
pub(crate) fn decode_record(
    fields: &HashMap<String, String>,
) -> Result<VerificationRecord, InfrastructureError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| InfrastructureError::Corrupt(format!("missing field '{}'", name)))
    };
    let millis = |name: &str| -> Result<DateTime<Utc>, InfrastructureError> {
        field(name)?
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| InfrastructureError::Corrupt(format!("bad timestamp in '{}'", name)))
    };

    Ok(VerificationRecord {
        phone_number: PhoneNumber::parse(field("phone")?)
            .map_err(|e| InfrastructureError::Corrupt(e.to_string()))?,
        code: field("code")?.clone(),
        owner_id: OwnerId::parse(field("owner_id")?),
        created_at: millis("created_at")?,
        expires_at: millis("expires_at")?,
        attempts: field("attempts")?
            .parse()
            .map_err(|_| InfrastructureError::Corrupt("bad attempts".to_string()))?,
        verified: field("verified")? == "1",
        transport: field("transport")?
            .parse::<Transport>()
            .map_err(InfrastructureError::Corrupt)?,
    })
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn find(&self, phone: &PhoneNumber) -> Result<Option<VerificationRecord>, DomainError> {
        let mut conn = self.client.connection();
        let fields: HashMap<String, String> = conn
            .hgetall(self.record_key(phone))
            .await
            .map_err(InfrastructureError::from)?;

        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_record(&fields)?))
    }

    async fn replace(
        &self,
        record: VerificationRecord,
        cooldown: Option<Duration>,
    ) -> Result<ReplaceOutcome, DomainError> {
        let mut conn = self.client.connection();
        let ledger_ttl_ms = self
            .ledger_retention
            .max(cooldown.unwrap_or_else(Duration::zero))
            .num_milliseconds()
            .max(1);

        let mut invocation = self.replace_script.prepare_invoke();
        invocation
            .key(self.record_key(&record.phone_number))
            .key(self.ledger_key(&record.phone_number))
            .arg(record.created_at.timestamp_millis())
            .arg(cooldown.map(|c| c.num_milliseconds()).unwrap_or(-1))
            .arg(ledger_ttl_ms)
            .arg(record.expires_at.timestamp_millis());
        for (name, value) in encode_record(&record) {
            invocation.arg(name).arg(value);
        }

        let remaining_ms: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        if remaining_ms > 0 {
            Ok(ReplaceOutcome::Throttled {
                wait_seconds: ((remaining_ms + 999) / 1000) as u64,
            })
        } else {
            Ok(ReplaceOutcome::Replaced)
        }
    }

    async fn delete(&self, phone: &PhoneNumber) -> Result<(), DomainError> {
        let mut conn = self.client.connection();
        conn.del::<_, ()>(self.record_key(phone))
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn delete_if_current(&self, record: &VerificationRecord) -> Result<bool, DomainError> {
        let mut conn = self.client.connection();
        let deleted: i64 = self
            .delete_if_current_script
            .key(self.record_key(&record.phone_number))
            .arg(record.created_at.timestamp_millis().to_string())
            .arg(&record.code)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(deleted == 1)
    }

    async fn register_attempt(
        &self,
        phone: &PhoneNumber,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, DomainError> {
        let mut conn = self.client.connection();
        let reply: Vec<String> = self
            .register_attempt_script
            .key(self.record_key(phone))
            .arg(max_attempts)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        let (status, rest) = reply
            .split_first()
            .ok_or_else(|| InfrastructureError::Corrupt("empty script reply".to_string()))?;

        if status == "0" {
            return Ok(AttemptOutcome::Missing);
        }

        let fields: HashMap<String, String> = rest
            .chunks(2)
            .filter_map(|pair| match pair {
                [k, v] => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect();
        let record = decode_record(&fields)?;

        Ok(if status == "1" {
            AttemptOutcome::Counted(record)
        } else {
            AttemptOutcome::Exhausted(record)
        })
    }

    async fn last_issued_at(&self, phone: &PhoneNumber) -> Result<Option<DateTime<Utc>>, DomainError> {
        let mut conn = self.client.connection();
        let value: Option<i64> = conn
            .get(self.ledger_key(phone))
            .await
            .map_err(InfrastructureError::from)?;
        Ok(value.and_then(DateTime::from_timestamp_millis))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        // Redis reclaims records through PEXPIREAT
        Ok(0)
    }
}
