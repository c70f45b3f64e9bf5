//! Integration storage.
//!
//! [`IntegrationStore`] is implemented by the Postgres repository used in
//! production and by an in-memory store used for local development and tests.

pub mod integration;
pub mod memory;

pub use integration::PgIntegrationStore;
pub use memory::MemoryIntegrationStore;

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use switchyard_core::{IntegrationId, OrganizationSlug, ProviderKey, Result};
use switchyard_integration::{Integration, IntegrationStatus, ProviderRef, ProviderRegistry};

/// A stored integration.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationRecord {
    pub id: IntegrationId,
    pub organization: OrganizationSlug,
    pub provider: ProviderKey,
    pub name: String,
    pub status: IntegrationStatus,
    /// Provider metadata captured by the setup pipeline.
    pub metadata: Map<String, JsonValue>,
    pub created_at: DateTime<Utc>,
    /// When `status` last changed; drives the deletion grace period.
    pub status_changed_at: DateTime<Utc>,
}

impl IntegrationRecord {
    /// Creates a new, visible integration.
    #[must_use]
    pub fn new(
        organization: OrganizationSlug,
        provider: ProviderKey,
        name: String,
        metadata: Map<String, JsonValue>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IntegrationId::generate(),
            organization,
            provider,
            name,
            status: IntegrationStatus::Visible,
            metadata,
            created_at: now,
            status_changed_at: now,
        }
    }

    /// The API representation, with the provider's display name if it is
    /// still registered.
    #[must_use]
    pub fn to_integration(&self, registry: &ProviderRegistry) -> Integration {
        Integration {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.status,
            provider: Some(ProviderRef {
                id: self.provider.clone(),
                name: registry.get(&self.provider).map(|p| p.name().to_string()),
            }),
        }
    }
}

/// Persistence for integrations.
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Integrations of `organization`, ordered by name, optionally filtered
    /// by status.
    async fn list(
        &self,
        organization: &OrganizationSlug,
        status: Option<IntegrationStatus>,
    ) -> Result<Vec<IntegrationRecord>, StoreError>;

    /// Finds an integration belonging to `organization`.
    async fn find(
        &self,
        organization: &OrganizationSlug,
        id: &IntegrationId,
    ) -> Result<Option<IntegrationRecord>, StoreError>;

    async fn insert(&self, record: &IntegrationRecord) -> Result<(), StoreError>;

    /// Moves an integration from `expected` to `status` and returns the
    /// updated record.
    ///
    /// Returns `None` if the integration no longer exists or its status is
    /// no longer `expected`; the check and the write are atomic.
    async fn transition(
        &self,
        id: &IntegrationId,
        expected: IntegrationStatus,
        status: IntegrationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<IntegrationRecord>, StoreError>;

    /// Integrations due for removal: queued for deletion, or left mid-removal
    /// by an earlier sweep, with a status change before `before`.
    async fn list_due_for_deletion(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<IntegrationRecord>, StoreError>;

    /// Removes an integration; returns whether it existed.
    async fn remove(&self, id: &IntegrationId) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_are_visible() {
        let record = IntegrationRecord::new(
            OrganizationSlug::from_static("acme"),
            ProviderKey::from_static("example"),
            "Ops".to_string(),
            Map::new(),
        );
        assert_eq!(record.status, IntegrationStatus::Visible);
        assert_eq!(record.created_at, record.status_changed_at);
    }

    #[test]
    fn wire_form_uses_registered_provider_name() {
        let registry = ProviderRegistry::with_builtin();
        let mut record = IntegrationRecord::new(
            OrganizationSlug::from_static("acme"),
            ProviderKey::from_static("example"),
            "Ops".to_string(),
            Map::new(),
        );

        let wire = record.to_integration(&registry);
        assert_eq!(wire.provider_name(), Some("Example"));

        record.provider = ProviderKey::from_static("retired");
        let wire = record.to_integration(&registry);
        assert_eq!(wire.provider_name(), Some("retired"));
    }
}
