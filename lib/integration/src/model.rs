//! Wire records exchanged with the integrations API.

use crate::status::IntegrationStatus;
use serde::{Deserialize, Serialize};
use switchyard_core::{IntegrationId, ProviderKey};

/// Reference to the provider that created an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    pub id: ProviderKey,
    #[serde(default)]
    pub name: Option<String>,
}

/// A configured connection between an organization and an external service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub id: IntegrationId,
    pub name: String,
    pub status: IntegrationStatus,
    #[serde(default)]
    pub provider: Option<ProviderRef>,
}

impl Integration {
    /// Name of the provider, falling back to its key.
    #[must_use]
    pub fn provider_name(&self) -> Option<&str> {
        self.provider
            .as_ref()
            .map(|p| p.name.as_deref().unwrap_or(p.id.as_str()))
    }
}

/// A kind of integration offered for setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderKey,
    pub name: String,
}

/// Body of `GET /organizations/{org}/config/integrations/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub providers: Vec<Provider>,
}

/// Body of `PUT /organizations/{org}/integrations/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: IntegrationStatus,
}

/// The fields of a mutation response the view reconciles with.
///
/// Servers answer with the full record, but only `id` and `status` are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: IntegrationId,
    pub status: IntegrationStatus,
}

impl From<&Integration> for StatusChange {
    fn from(integration: &Integration) -> Self {
        Self {
            id: integration.id.clone(),
            status: integration.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_mutation_response_decodes() {
        let change: StatusChange =
            serde_json::from_str(r#"{"id":1,"status":"pending_deletion"}"#).expect("decode");
        assert_eq!(change.id.as_str(), "1");
        assert_eq!(change.status, IntegrationStatus::PendingDeletion);
    }

    #[test]
    fn full_record_decodes_as_status_change() {
        let body = r#"{"id":"int_1","name":"GitHub","status":"visible","provider":{"id":"github","name":"GitHub"}}"#;
        let change: StatusChange = serde_json::from_str(body).expect("decode");
        assert_eq!(change.status, IntegrationStatus::Visible);
    }

    #[test]
    fn provider_name_falls_back_to_key() {
        let mut integration: Integration = serde_json::from_str(
            r#"{"id":"1","name":"Mine","status":"visible","provider":{"id":"example"}}"#,
        )
        .expect("decode");
        assert_eq!(integration.provider_name(), Some("example"));

        integration.provider = None;
        assert_eq!(integration.provider_name(), None);
    }

    #[test]
    fn cancel_body_shape() {
        let body = StatusUpdate {
            status: IntegrationStatus::Visible,
        };
        assert_eq!(
            serde_json::to_value(body).expect("encode"),
            serde_json::json!({"status": "visible"})
        );
    }
}
