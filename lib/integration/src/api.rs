//! The integrations REST API as seen by the view.

use crate::error::ApiError;
use crate::model::{Integration, ProviderConfig, StatusChange};
use crate::status::IntegrationStatus;
use async_trait::async_trait;
use switchyard_core::{IntegrationId, OrganizationSlug, ProviderKey, Result};

/// Mount point of the REST API on the server.
pub const API_PREFIX: &str = "/api/0";

/// Query parameter carrying a setup failure back to the integrations page.
pub const SETUP_ERROR_PARAM: &str = "setup_error";

/// Browser path of the integrations page.
#[must_use]
pub fn integrations_page_path(org: &OrganizationSlug) -> String {
    format!("/organizations/{org}/integrations")
}

/// Path of the organization's integration collection.
#[must_use]
pub fn integrations_path(org: &OrganizationSlug) -> String {
    format!("/organizations/{org}/integrations/")
}

/// Path of a single integration.
#[must_use]
pub fn integration_path(org: &OrganizationSlug, id: &IntegrationId) -> String {
    format!("/organizations/{org}/integrations/{id}/")
}

/// Path of the provider configuration.
#[must_use]
pub fn provider_config_path(org: &OrganizationSlug) -> String {
    format!("/organizations/{org}/config/integrations/")
}

/// Path of a provider's setup pipeline.
#[must_use]
pub fn setup_path(org: &OrganizationSlug, provider: &ProviderKey) -> String {
    format!("/organizations/{org}/integrations/{provider}/setup/")
}

/// Requests the integrations view issues.
///
/// Futures are not `Send`: the view runs on a single-threaded event loop.
#[async_trait(?Send)]
pub trait IntegrationsApi {
    /// `GET /organizations/{org}/integrations/?status=`; `None` lists all.
    async fn list_integrations(
        &self,
        org: &OrganizationSlug,
        status: Option<IntegrationStatus>,
    ) -> Result<Vec<Integration>, ApiError>;

    /// `GET /organizations/{org}/config/integrations/`.
    async fn provider_config(&self, org: &OrganizationSlug) -> Result<ProviderConfig, ApiError>;

    /// `DELETE /organizations/{org}/integrations/{id}/`.
    async fn delete_integration(
        &self,
        org: &OrganizationSlug,
        id: &IntegrationId,
    ) -> Result<StatusChange, ApiError>;

    /// `PUT /organizations/{org}/integrations/{id}/` with `{status}`.
    async fn update_status(
        &self,
        org: &OrganizationSlug,
        id: &IntegrationId,
        status: IntegrationStatus,
    ) -> Result<StatusChange, ApiError>;
}
