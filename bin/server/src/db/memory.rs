//! In-memory integration store.

use super::{IntegrationRecord, IntegrationStore};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use switchyard_core::{IntegrationId, OrganizationSlug, Result};
use switchyard_integration::IntegrationStatus;
use tokio::sync::Mutex;

/// Keeps integrations in process memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryIntegrationStore {
    records: Mutex<HashMap<IntegrationId, IntegrationRecord>>,
}

impl MemoryIntegrationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntegrationStore for MemoryIntegrationStore {
    async fn list(
        &self,
        organization: &OrganizationSlug,
        status: Option<IntegrationStatus>,
    ) -> Result<Vec<IntegrationRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut found: Vec<IntegrationRecord> = records
            .values()
            .filter(|r| r.organization == *organization)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find(
        &self,
        organization: &OrganizationSlug,
        id: &IntegrationId,
    ) -> Result<Option<IntegrationRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records
            .get(id)
            .filter(|r| r.organization == *organization)
            .cloned())
    }

    async fn insert(&self, record: &IntegrationRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn transition(
        &self,
        id: &IntegrationId,
        expected: IntegrationStatus,
        status: IntegrationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<IntegrationRecord>, StoreError> {
        let mut records = self.records.lock().await;
        Ok(records
            .get_mut(id)
            .filter(|r| r.status == expected)
            .map(|record| {
                record.status = status;
                record.status_changed_at = at;
                record.clone()
            }))
    }

    async fn list_due_for_deletion(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<IntegrationRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut due: Vec<IntegrationRecord> = records
            .values()
            .filter(|r| {
                matches!(
                    r.status,
                    IntegrationStatus::PendingDeletion | IntegrationStatus::DeletionInProgress
                ) && r.status_changed_at < before
            })
            .cloned()
            .collect();
        due.sort_by_key(|r| r.status_changed_at);
        Ok(due)
    }

    async fn remove(&self, id: &IntegrationId) -> Result<bool, StoreError> {
        Ok(self.records.lock().await.remove(id).is_some())
    }
}
