//! Domain error types for server operations.
//!
//! Storage errors travel as rootcause reports; handlers turn them into
//! [`HttpError`]s, which carry only user-safe messages to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use switchyard_integration::IntegrationStatus;

/// Errors from an integration store.
#[derive(Debug)]
pub enum StoreError {
    /// The backing database failed.
    DatabaseError { details: String },
    /// A stored row could not be decoded.
    CorruptRecord { id: String, details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseError { details } => {
                write!(f, "integration database error: {}", details)
            }
            Self::CorruptRecord { id, details } => {
                write!(f, "integration '{}' is corrupt: {}", id, details)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors returned by the REST and setup handlers.
#[derive(Debug)]
pub enum HttpError {
    /// Integration was not found in the organization.
    NotFound { id: String },
    /// The requested status filter or target is not accepted.
    InvalidStatus { status: String },
    /// The integration's current status does not allow the change.
    Conflict {
        id: String,
        current: IntegrationStatus,
        requested: IntegrationStatus,
    },
    /// No provider is registered under the key.
    UnknownProvider { key: String },
    /// Storage failed.
    Storage { details: String },
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "integration '{}' not found", id),
            Self::InvalidStatus { status } => write!(f, "invalid status '{}'", status),
            Self::Conflict {
                id,
                current,
                requested,
            } => write!(
                f,
                "integration '{}' is '{}', cannot change to '{}'",
                id, current, requested
            ),
            Self::UnknownProvider { key } => write!(f, "unknown provider '{}'", key),
            Self::Storage { details } => write!(f, "storage error: {}", details),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    /// Status code and user-safe message.
    pub fn parts(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "Integration not found".to_string()),
            Self::InvalidStatus { status } => (
                StatusCode::BAD_REQUEST,
                format!("Invalid status '{}'", status),
            ),
            Self::Conflict { current, .. } => (
                StatusCode::CONFLICT,
                format!("Integration is {}", current),
            ),
            Self::UnknownProvider { .. } => {
                (StatusCode::NOT_FOUND, "Provider not found".to_string())
            }
            Self::Storage { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
        }
    }
}

impl From<rootcause::Report<StoreError>> for HttpError {
    fn from(report: rootcause::Report<StoreError>) -> Self {
        tracing::error!(error = %report, "storage operation failed");
        Self::Storage {
            details: report.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, detail) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
