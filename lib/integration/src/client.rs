//! HTTP implementation of [`IntegrationsApi`] on top of reqwest.
//!
//! Works natively and in the browser (reqwest uses `fetch` on wasm32).

use crate::api::{IntegrationsApi, integration_path, integrations_path, provider_config_path};
use crate::error::ApiError;
use crate::model::{Integration, ProviderConfig, StatusChange, StatusUpdate};
use crate::status::IntegrationStatus;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use switchyard_core::{IntegrationId, OrganizationSlug, Result};
use tracing::{debug, instrument};

/// Talks to the integrations API at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpIntegrationsApi {
    client: Client,
    base_url: String,
}

impl HttpIntegrationsApi {
    /// Creates a client for the API rooted at `base_url` (e.g. `https://host/api/0`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn method_name(method: &Method) -> &'static str {
        [Method::GET, Method::PUT, Method::DELETE, Method::POST]
            .iter()
            .zip(["GET", "PUT", "DELETE", "POST"])
            .find_map(|(m, name)| (m == method).then_some(name))
            .unwrap_or("OTHER")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, ApiError> {
        let name = Self::method_name(&method);
        let request = build(self.client.request(method, self.url(&path)));

        let response = request.send().await.map_err(|e| ApiError::Transport {
            method: name,
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(method = name, %path, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                method: name,
                path,
                status: status.as_u16(),
            }
            .into());
        }

        Ok(response.json::<T>().await.map_err(|e| ApiError::Decode {
            method: name,
            path,
            reason: e.to_string(),
        })?)
    }
}

#[async_trait(?Send)]
impl IntegrationsApi for HttpIntegrationsApi {
    #[instrument(skip(self), fields(org = %org))]
    async fn list_integrations(
        &self,
        org: &OrganizationSlug,
        status: Option<IntegrationStatus>,
    ) -> Result<Vec<Integration>, ApiError> {
        let filter = status.map(|s| s.as_str()).unwrap_or_default();
        self.send(Method::GET, integrations_path(org), |r| {
            r.query(&[("status", filter)])
        })
        .await
    }

    #[instrument(skip(self), fields(org = %org))]
    async fn provider_config(&self, org: &OrganizationSlug) -> Result<ProviderConfig, ApiError> {
        self.send(Method::GET, provider_config_path(org), |r| r).await
    }

    #[instrument(skip(self), fields(org = %org, integration_id = %id))]
    async fn delete_integration(
        &self,
        org: &OrganizationSlug,
        id: &IntegrationId,
    ) -> Result<StatusChange, ApiError> {
        self.send(Method::DELETE, integration_path(org, id), |r| r)
            .await
    }

    #[instrument(skip(self), fields(org = %org, integration_id = %id, status = %status))]
    async fn update_status(
        &self,
        org: &OrganizationSlug,
        id: &IntegrationId,
        status: IntegrationStatus,
    ) -> Result<StatusChange, ApiError> {
        let body = StatusUpdate { status };
        self.send(Method::PUT, integration_path(org, id), |r| r.json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let api = HttpIntegrationsApi::new("http://localhost:3000/api/0/");
        assert_eq!(
            api.url("/organizations/acme/integrations/"),
            "http://localhost:3000/api/0/organizations/acme/integrations/"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Reserve a free port, then release it so nothing is listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .expect("bind ephemeral port")
            .port();
        let api = HttpIntegrationsApi::new(format!("http://127.0.0.1:{port}"));
        let org: OrganizationSlug = "acme".parse().expect("valid slug");

        let err = api.provider_config(&org).await.unwrap_err();
        assert!(matches!(err.current_context(), ApiError::Transport { .. }));
        assert!(err.to_string().contains("GET /organizations/acme/config/integrations/"));
    }
}
