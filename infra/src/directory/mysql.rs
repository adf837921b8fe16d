//! MySQL user directory
//!
//! Uses the `phone_verifications` table from `migrations/`. Queries are
//! runtime-checked so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool, Row,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::log::LevelFilter;
use tracing::{error, info};

use pv_core::domain::{OwnerId, PhoneNumber};
use pv_core::errors::{DomainError, VerificationError};
use pv_core::repositories::UserDirectory;
use pv_shared::DirectoryConfig;

use crate::InfrastructureError;

/// User directory backed by MySQL
#[derive(Clone)]
pub struct MySqlUserDirectory {
    pool: MySqlPool,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the connection pool and the directory on top of it
    pub async fn connect(config: &DirectoryConfig) -> Result<Self, InfrastructureError> {
        info!(
            "Creating database connection pool with max_connections: {}",
            config.max_connections
        );

        let connect_options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_secs(1));

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                InfrastructureError::Database(e)
            })?;

        info!("Database connection pool created successfully");
        Ok(Self::new(pool))
    }

    /// Check connectivity with `SELECT 1`
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let row = sqlx::query("SELECT 1 AS ok").fetch_one(&self.pool).await?;
        let ok: i64 = row.try_get("ok")?;
        Ok(ok == 1)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

fn internal(context: &str, error: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("{}: {}", context, error),
    }
}

#[async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn lookup_verified_owner(&self, phone: &PhoneNumber) -> Result<Option<OwnerId>, DomainError> {
        let query = "SELECT owner_id FROM phone_verifications WHERE phone_number = ?";

        let row = sqlx::query(query)
            .bind(phone.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal("Failed to look up phone owner", e))?;

        match row {
            Some(row) => {
                let owner: String = row
                    .try_get("owner_id")
                    .map_err(|e| internal("Failed to read owner_id", e))?;
                Ok(OwnerId::parse(&owner))
            }
            None => Ok(None),
        }
    }

    async fn mark_phone_verified(
        &self,
        owner: &OwnerId,
        phone: &PhoneNumber,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| internal("Failed to begin transaction", e))?;

        let existing = sqlx::query("SELECT owner_id FROM phone_verifications WHERE phone_number = ? FOR UPDATE")
            .bind(phone.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal("Failed to lock phone binding", e))?;

        if let Some(row) = existing {
            let holder: String = row
                .try_get("owner_id")
                .map_err(|e| internal("Failed to read owner_id", e))?;
            if holder != owner.as_str() {
                return Err(VerificationError::PhoneAlreadyRegistered.into());
            }
            sqlx::query("UPDATE phone_verifications SET verified_at = ? WHERE phone_number = ?")
                .bind(at)
                .bind(phone.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| internal("Failed to refresh phone binding", e))?;
        } else {
            // An owner keeps one number; drop the previous binding
            sqlx::query("DELETE FROM phone_verifications WHERE owner_id = ?")
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| internal("Failed to release previous binding", e))?;

            let inserted = sqlx::query(
                "INSERT INTO phone_verifications (phone_number, owner_id, verified_at) VALUES (?, ?, ?)",
            )
            .bind(phone.as_str())
            .bind(owner.as_str())
            .bind(at)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                if is_unique_violation(&e) {
                    return Err(VerificationError::PhoneAlreadyRegistered.into());
                }
                return Err(internal("Failed to bind phone", e));
            }
        }

        tx.commit()
            .await
            .map_err(|e| internal("Failed to commit phone binding", e))?;

        info!(
            phone = %phone.masked(),
            event = "phone_marked_verified",
            "Phone number bound to account"
        );
        Ok(())
    }
}
