//! Shared state for request handlers.

use crate::db::IntegrationStore;
use crate::setup::SetupSessions;
use std::sync::Arc;
use switchyard_integration::ProviderRegistry;

/// Application state shared by the REST and setup handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IntegrationStore>,
    pub registry: Arc<ProviderRegistry>,
    pub setup_sessions: SetupSessions,
}

impl AppState {
    pub fn new(store: Arc<dyn IntegrationStore>, registry: ProviderRegistry) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            setup_sessions: SetupSessions::default(),
        }
    }

    /// Replaces the setup session store, e.g. one with a configured expiry.
    #[must_use]
    pub fn with_setup_sessions(mut self, setup_sessions: SetupSessions) -> Self {
        self.setup_sessions = setup_sessions;
        self
    }
}
