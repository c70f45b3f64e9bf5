//! The organization integrations view controller.
//!
//! The controller holds no UI code. It talks to the API, the indicator sink,
//! and the confirmation prompt through injected capabilities, and writes
//! results into a [`ViewState`] the UI layer renders from.

use crate::api::IntegrationsApi;
use crate::confirm::{Confirm, DELETE_PROMPT};
use crate::error::ApiError;
use crate::list::IntegrationList;
use crate::model::{Integration, Provider, ProviderConfig, StatusChange};
use crate::notify::{ERROR_DURATION, ERROR_MESSAGE, IndicatorKind, Notifier, SAVING_MESSAGE};
use crate::status::IntegrationStatus;
use std::cell::RefCell;
use std::rc::Rc;
use switchyard_core::{IntegrationId, OrganizationSlug, Result};
use tracing::{debug, warn};

/// Title shown in navigation chrome.
pub const TITLE: &str = "Integrations";

/// Where the view keeps what it renders.
pub trait ViewState {
    /// Mutates the integration list in place.
    fn update_items(&self, f: impl FnOnce(&mut IntegrationList));

    /// Replaces the provider configuration.
    fn set_config(&self, config: ProviderConfig);
}

/// Plain in-memory [`ViewState`].
#[derive(Debug, Default)]
pub struct MemoryViewState {
    pub items: RefCell<IntegrationList>,
    pub config: RefCell<Option<ProviderConfig>>,
}

impl ViewState for MemoryViewState {
    fn update_items(&self, f: impl FnOnce(&mut IntegrationList)) {
        f(&mut self.items.borrow_mut());
    }

    fn set_config(&self, config: ProviderConfig) {
        *self.config.borrow_mut() = Some(config);
    }
}

impl<S: ViewState> ViewState for Rc<S> {
    fn update_items(&self, f: impl FnOnce(&mut IntegrationList)) {
        (**self).update_items(f);
    }

    fn set_config(&self, config: ProviderConfig) {
        (**self).set_config(config);
    }
}

/// Everything the view fetches on mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewData {
    pub item_list: IntegrationList,
    pub config: ProviderConfig,
}

/// Fetches the integration list (unfiltered) and the provider configuration
/// concurrently. Fails if either request fails.
pub async fn load_view_data<A: IntegrationsApi + ?Sized>(
    api: &A,
    org: &OrganizationSlug,
) -> Result<ViewData, ApiError> {
    let (items, config) = futures::try_join!(
        api.list_integrations(org, None),
        api.provider_config(org)
    )?;
    Ok(ViewData {
        item_list: items.into(),
        config,
    })
}

/// Callback that starts the add-integration flow for a provider.
pub type Launcher = Rc<dyn Fn(&Provider)>;

/// Controller for one organization's integrations screen.
pub struct IntegrationsView<A, S> {
    org: OrganizationSlug,
    api: A,
    state: S,
    notifier: Rc<dyn Notifier>,
    confirm: Rc<dyn Confirm>,
    launcher: Option<Launcher>,
}

impl<A, S> IntegrationsView<A, S>
where
    A: IntegrationsApi,
    S: ViewState,
{
    pub fn new(
        org: OrganizationSlug,
        api: A,
        state: S,
        notifier: Rc<dyn Notifier>,
        confirm: Rc<dyn Confirm>,
    ) -> Self {
        Self {
            org,
            api,
            state,
            notifier,
            confirm,
            launcher: None,
        }
    }

    /// Installs the handler behind [`launch_add_integration`](Self::launch_add_integration).
    #[must_use]
    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = Some(launcher);
        self
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        TITLE
    }

    #[must_use]
    pub fn organization(&self) -> &OrganizationSlug {
        &self.org
    }

    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Loads both endpoints and populates the state once both succeed.
    ///
    /// On failure the state is left untouched and the error is returned so
    /// the page can show its load-error panel.
    pub async fn mount(&self) -> Result<(), ApiError> {
        let data = load_view_data(&self.api, &self.org).await?;
        debug!(
            org = %self.org,
            integrations = data.item_list.len(),
            providers = data.config.providers.len(),
            "integrations view loaded"
        );
        self.state.update_items(|list| *list = data.item_list);
        self.state.set_config(data.config);
        Ok(())
    }

    /// Requests removal of `integration` after the user confirms.
    pub async fn delete_integration(&self, integration: &Integration) {
        if !self.confirm.confirm(DELETE_PROMPT) {
            debug!(integration_id = %integration.id, "delete declined");
            return;
        }
        self.mutate(
            "delete",
            &integration.id,
            self.api.delete_integration(&self.org, &integration.id),
        )
        .await;
    }

    /// Cancels a queued removal by setting the integration visible again.
    pub async fn cancel_delete(&self, integration: &Integration) {
        self.mutate(
            "cancel_delete",
            &integration.id,
            self.api
                .update_status(&self.org, &integration.id, IntegrationStatus::Visible),
        )
        .await;
    }

    /// Adds an integration created elsewhere and re-sorts by name.
    pub fn on_add_integration(&self, integration: Integration) {
        self.state
            .update_items(|list| list.insert_sorted(integration));
    }

    /// Starts the add flow for `provider`. Without a launcher this does nothing.
    pub fn launch_add_integration(&self, provider: &Provider) {
        if let Some(launcher) = &self.launcher {
            launcher(provider);
        }
    }

    /// Shows `message` as a timed error indicator.
    pub fn show_error(&self, message: &str) {
        self.notifier
            .add(message, IndicatorKind::Error, Some(ERROR_DURATION));
    }

    async fn mutate(
        &self,
        action: &'static str,
        id: &IntegrationId,
        request: impl Future<Output = Result<StatusChange, ApiError>>,
    ) {
        let indicator = self
            .notifier
            .add(SAVING_MESSAGE, IndicatorKind::Loading, None);

        match request.await {
            Ok(change) => {
                debug!(action, integration_id = %id, status = %change.status, "integration updated");
                self.state.update_items(|list| {
                    list.apply_status(&change);
                });
            }
            Err(e) => {
                warn!(action, integration_id = %id, error = %e, "integration request failed");
                self.show_error(ERROR_MESSAGE);
            }
        }

        self.notifier.remove(indicator);
    }
}
