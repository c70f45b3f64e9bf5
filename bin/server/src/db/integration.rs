//! Postgres repository for integrations.

use super::{IntegrationRecord, IntegrationStore};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rootcause::prelude::Report;
use serde_json::{Map, Value as JsonValue};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use switchyard_core::{IntegrationId, OrganizationSlug, ProviderKey, Result};
use switchyard_integration::IntegrationStatus;
use tracing::instrument;

/// Row type for integration queries.
#[derive(FromRow)]
struct IntegrationRow {
    id: String,
    organization: String,
    provider: String,
    name: String,
    status: String,
    metadata: JsonValue,
    created_at: DateTime<Utc>,
    status_changed_at: DateTime<Utc>,
}

impl IntegrationRow {
    fn try_into_record(self) -> Result<IntegrationRecord, StoreError> {
        let corrupt = |details: String| StoreError::CorruptRecord {
            id: self.id.clone(),
            details,
        };

        let id = IntegrationId::from_str(&self.id).map_err(|e| corrupt(e.to_string()))?;
        let organization =
            OrganizationSlug::from_str(&self.organization).map_err(|e| corrupt(e.to_string()))?;
        let provider =
            ProviderKey::from_str(&self.provider).map_err(|e| corrupt(e.to_string()))?;
        let metadata = match self.metadata {
            JsonValue::Object(map) => map,
            JsonValue::Null => Map::new(),
            other => return Err(corrupt(format!("metadata is not an object: {other}")).into()),
        };

        Ok(IntegrationRecord {
            id,
            organization,
            provider,
            name: self.name,
            status: IntegrationStatus::from_str_value(&self.status),
            metadata,
            created_at: self.created_at,
            status_changed_at: self.status_changed_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> Report<StoreError> {
    StoreError::DatabaseError {
        details: e.to_string(),
    }
    .into()
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, organization, provider, name, status, metadata,
           created_at, status_changed_at
    FROM integrations
"#;

/// Repository backed by the `integrations` table.
#[derive(Clone)]
pub struct PgIntegrationStore {
    pool: PgPool,
}

impl PgIntegrationStore {
    /// Creates a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntegrationStore for PgIntegrationStore {
    #[instrument(skip(self), fields(org = %organization))]
    async fn list(
        &self,
        organization: &OrganizationSlug,
        status: Option<IntegrationStatus>,
    ) -> Result<Vec<IntegrationRecord>, StoreError> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE organization = $1 AND ($2::text IS NULL OR status = $2) ORDER BY name ASC, id ASC"
        );
        let rows: Vec<IntegrationRow> = sqlx::query_as(&query)
            .bind(organization.as_str())
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.into_iter().map(IntegrationRow::try_into_record).collect()
    }

    #[instrument(skip(self), fields(org = %organization, integration_id = %id))]
    async fn find(
        &self,
        organization: &OrganizationSlug,
        id: &IntegrationId,
    ) -> Result<Option<IntegrationRecord>, StoreError> {
        let query = format!("{SELECT_COLUMNS} WHERE id = $1 AND organization = $2");
        let row: Option<IntegrationRow> = sqlx::query_as(&query)
            .bind(id.as_str())
            .bind(organization.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(IntegrationRow::try_into_record).transpose()
    }

    #[instrument(skip(self, record), fields(integration_id = %record.id))]
    async fn insert(&self, record: &IntegrationRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO integrations
                (id, organization, provider, name, status, metadata,
                 created_at, status_changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.organization.as_str())
        .bind(record.provider.as_str())
        .bind(&record.name)
        .bind(record.status.as_str())
        .bind(JsonValue::Object(record.metadata.clone()))
        .bind(record.created_at)
        .bind(record.status_changed_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(integration_id = %id, from = %expected, to = %status))]
    async fn transition(
        &self,
        id: &IntegrationId,
        expected: IntegrationStatus,
        status: IntegrationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<IntegrationRecord>, StoreError> {
        let row: Option<IntegrationRow> = sqlx::query_as(
            r#"
            UPDATE integrations
            SET status = $3, status_changed_at = $4
            WHERE id = $1 AND status = $2
            RETURNING id, organization, provider, name, status, metadata,
                      created_at, status_changed_at
            "#,
        )
        .bind(id.as_str())
        .bind(expected.as_str())
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(IntegrationRow::try_into_record).transpose()
    }

    #[instrument(skip(self))]
    async fn list_due_for_deletion(
        &self,
        before: DateTime<Utc>,
    ) -> Result<Vec<IntegrationRecord>, StoreError> {
        let query = format!(
            "{SELECT_COLUMNS} WHERE status IN ($1, $2) AND status_changed_at < $3 ORDER BY status_changed_at ASC"
        );
        let rows: Vec<IntegrationRow> = sqlx::query_as(&query)
            .bind(IntegrationStatus::PendingDeletion.as_str())
            .bind(IntegrationStatus::DeletionInProgress.as_str())
            .bind(before)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.into_iter().map(IntegrationRow::try_into_record).collect()
    }

    #[instrument(skip(self), fields(integration_id = %id))]
    async fn remove(&self, id: &IntegrationId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM integrations
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
