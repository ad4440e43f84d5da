//! Periodic purge of sessions that can no longer be used.
//!
//! Revoked rows are kept for audit after logout or supersession; this job
//! deletes them, along with rows whose refresh token lapsed, once they are
//! older than the retention period.

use std::time::Duration;

use authgate_auth::store::PgStore;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(
    store: PgStore,
    interval: Duration,
    retention_days: i64,
    cancel: CancellationToken,
) {
    tracing::info!(
        retention_days,
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match store.delete_stale_sessions(cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session cleanup: purged stale sessions");
                        } else {
                            tracing::debug!("Session cleanup: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session cleanup: purge failed");
                    }
                }
            }
        }
    }
}
