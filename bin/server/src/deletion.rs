//! Background removal of integrations queued for deletion.

use crate::config::DeletionConfig;
use crate::db::{IntegrationRecord, IntegrationStore};
use crate::error::StoreError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use switchyard_core::Result;
use switchyard_integration::IntegrationStatus;

/// Removes every integration whose deletion has been due for longer than
/// `grace`. Returns how many were removed.
///
/// A `pending_deletion` integration is claimed as `deletion_in_progress`
/// only if it is still queued, so a cancel that lands after the listing
/// wins. Integrations left `deletion_in_progress` by a failed removal are
/// retried once they have been stuck for `grace`.
pub async fn sweep(
    store: &dyn IntegrationStore,
    grace: ChronoDuration,
) -> Result<usize, StoreError> {
    let cutoff = Utc::now()
        .checked_sub_signed(grace)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let due = store.list_due_for_deletion(cutoff).await?;

    let mut removed = 0;
    for record in due {
        match remove_due(store, &record).await {
            Ok(true) => {
                tracing::info!(
                    org = %record.organization,
                    integration_id = %record.id,
                    "integration deleted"
                );
                removed += 1;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    org = %record.organization,
                    integration_id = %record.id,
                    error = %e,
                    "Failed to delete integration"
                );
            }
        }
    }
    Ok(removed)
}

async fn remove_due(
    store: &dyn IntegrationStore,
    record: &IntegrationRecord,
) -> Result<bool, StoreError> {
    if record.status == IntegrationStatus::PendingDeletion {
        let claimed = store
            .transition(
                &record.id,
                IntegrationStatus::PendingDeletion,
                IntegrationStatus::DeletionInProgress,
                Utc::now(),
            )
            .await?;
        if claimed.is_none() {
            tracing::debug!(integration_id = %record.id, "deletion cancelled before sweep");
            return Ok(false);
        }
    }
    store.remove(&record.id).await
}

/// Runs [`sweep`] on the configured interval until the process exits.
pub fn spawn(store: Arc<dyn IntegrationStore>, config: &DeletionConfig) {
    let interval_secs = config.interval_seconds;
    let grace = config.grace_period();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            match sweep(store.as_ref(), grace).await {
                Ok(count) if count > 0 => {
                    tracing::debug!(deleted_integrations = count, "Periodic deletion sweep");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to sweep integrations pending deletion");
                }
            }
        }
    });
}
