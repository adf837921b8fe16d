//! Background reclamation of expired records

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use pv_core::repositories::CodeStore;

/// Spawn a task that calls [`CodeStore::purge_expired`] every `interval`
///
/// The task runs until the returned handle is aborted or the runtime shuts
/// down. Failures are logged and the next tick tries again.
pub fn spawn_expiry_sweeper(store: Arc<dyn CodeStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_seconds = interval.as_secs(),
            "Verification record sweeper started"
        );

        let mut timer = tokio::time::interval(interval);
        // The first tick completes immediately
        timer.tick().await;

        loop {
            timer.tick().await;
            if let Err(e) = store.purge_expired(Utc::now()).await {
                error!(error = %e, event = "otp_purge_failed", "Failed to purge expired verification records");
            }
        }
    })
}
