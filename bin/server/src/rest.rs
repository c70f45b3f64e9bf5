//! REST endpoints for organization integrations.
//!
//! Mounted under [`API_PREFIX`]. Status transitions are enforced here; the
//! client only echoes what these handlers return.

use crate::db::IntegrationRecord;
use crate::error::HttpError;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use switchyard_core::{IntegrationId, OrganizationSlug};
use switchyard_integration::{Integration, IntegrationStatus, ProviderConfig, StatusUpdate};

pub use switchyard_integration::api::API_PREFIX;

/// Routes relative to [`API_PREFIX`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org}/integrations/",
            get(list_integrations),
        )
        .route(
            "/organizations/{org}/integrations/{id}/",
            get(get_integration)
                .delete(delete_integration)
                .put(update_integration),
        )
        .route(
            "/organizations/{org}/config/integrations/",
            get(provider_config),
        )
}

/// Query string of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Empty lists every status.
    #[serde(default)]
    status: String,
}

impl ListQuery {
    fn filter(&self) -> Result<Option<IntegrationStatus>, HttpError> {
        if self.status.is_empty() {
            return Ok(None);
        }
        match IntegrationStatus::from_str_value(&self.status) {
            IntegrationStatus::Unknown => Err(HttpError::InvalidStatus {
                status: self.status.clone(),
            }),
            status => Ok(Some(status)),
        }
    }
}

/// Status a DELETE moves an integration to, or `None` if it is already
/// queued.
pub fn deletion_target(
    id: &IntegrationId,
    current: IntegrationStatus,
) -> Result<Option<IntegrationStatus>, HttpError> {
    match current {
        IntegrationStatus::Visible | IntegrationStatus::Hidden => {
            Ok(Some(IntegrationStatus::PendingDeletion))
        }
        IntegrationStatus::PendingDeletion => Ok(None),
        IntegrationStatus::DeletionInProgress | IntegrationStatus::Unknown => {
            Err(HttpError::Conflict {
                id: id.to_string(),
                current,
                requested: IntegrationStatus::PendingDeletion,
            })
        }
    }
}

/// Status a PUT moves an integration to, or `None` if nothing changes.
///
/// Clients may only ask for `visible` or `hidden`; moving a queued
/// integration back to `visible` cancels its deletion.
pub fn update_target(
    id: &IntegrationId,
    current: IntegrationStatus,
    requested: IntegrationStatus,
) -> Result<Option<IntegrationStatus>, HttpError> {
    if !matches!(
        requested,
        IntegrationStatus::Visible | IntegrationStatus::Hidden
    ) {
        return Err(HttpError::InvalidStatus {
            status: requested.to_string(),
        });
    }
    match current {
        IntegrationStatus::DeletionInProgress | IntegrationStatus::Unknown => {
            Err(HttpError::Conflict {
                id: id.to_string(),
                current,
                requested,
            })
        }
        _ if current == requested => Ok(None),
        _ => Ok(Some(requested)),
    }
}

/// Moves `record` to `target` if its status is still the one the decision
/// was made from.
async fn apply_transition(
    state: &AppState,
    org: &OrganizationSlug,
    record: &IntegrationRecord,
    target: IntegrationStatus,
) -> Result<IntegrationRecord, HttpError> {
    let updated = state
        .store
        .transition(&record.id, record.status, target, Utc::now())
        .await?;
    if let Some(updated) = updated {
        return Ok(updated);
    }

    match state.store.find(org, &record.id).await? {
        Some(current) => {
            tracing::debug!(
                integration_id = %record.id,
                read = %record.status,
                current = %current.status,
                "integration changed during update"
            );
            Err(HttpError::Conflict {
                id: record.id.to_string(),
                current: current.status,
                requested: target,
            })
        }
        None => Err(HttpError::NotFound {
            id: record.id.to_string(),
        }),
    }
}

async fn list_integrations(
    State(state): State<AppState>,
    Path(org): Path<OrganizationSlug>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Integration>>, HttpError> {
    let records = state.store.list(&org, query.filter()?).await?;
    Ok(Json(
        records
            .iter()
            .map(|r| r.to_integration(&state.registry))
            .collect(),
    ))
}

async fn get_integration(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationSlug, IntegrationId)>,
) -> Result<Json<Integration>, HttpError> {
    let record = state
        .store
        .find(&org, &id)
        .await?
        .ok_or_else(|| HttpError::NotFound { id: id.to_string() })?;
    Ok(Json(record.to_integration(&state.registry)))
}

async fn delete_integration(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationSlug, IntegrationId)>,
) -> Result<Json<Integration>, HttpError> {
    let record = state
        .store
        .find(&org, &id)
        .await?
        .ok_or_else(|| HttpError::NotFound { id: id.to_string() })?;

    let Some(target) = deletion_target(&id, record.status)? else {
        return Ok(Json(record.to_integration(&state.registry)));
    };

    let updated = apply_transition(&state, &org, &record, target).await?;
    tracing::info!(org = %org, integration_id = %id, "integration deletion requested");
    Ok(Json(updated.to_integration(&state.registry)))
}

async fn update_integration(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationSlug, IntegrationId)>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Integration>, HttpError> {
    let record = state
        .store
        .find(&org, &id)
        .await?
        .ok_or_else(|| HttpError::NotFound { id: id.to_string() })?;

    let Some(target) = update_target(&id, record.status, body.status)? else {
        return Ok(Json(record.to_integration(&state.registry)));
    };

    let updated = apply_transition(&state, &org, &record, target).await?;
    tracing::info!(
        org = %org,
        integration_id = %id,
        from = %record.status,
        to = %target,
        "integration status changed"
    );
    Ok(Json(updated.to_integration(&state.registry)))
}

async fn provider_config(
    State(state): State<AppState>,
    Path(_org): Path<OrganizationSlug>,
) -> Json<ProviderConfig> {
    Json(state.registry.config())
}
