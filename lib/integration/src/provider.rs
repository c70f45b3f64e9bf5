//! Integration providers and the registry that offers them.
//!
//! A provider describes a kind of third-party connection: how to set it up
//! (an ordered pipeline of steps) and what metadata a finished setup stores.

use crate::model::{Provider, ProviderConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use switchyard_core::ProviderKey;

/// Submitted form fields for a pipeline step.
pub type FormFields = HashMap<String, String>;

/// Values bound by pipeline steps, carried across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState(BTreeMap<String, String>);

impl PipelineState {
    pub fn bind(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn fetch(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// What a step decided for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Show this HTML to the user and wait for the next request.
    Render(String),
    /// Move on to the next step.
    Advance,
    /// Abort setup with a user-facing message.
    Fail(String),
}

/// One step of a provider's setup pipeline.
pub trait PipelineView: Send + Sync {
    /// Stable name, used in the pipeline signature and in errors.
    fn name(&self) -> &'static str;

    fn dispatch(&self, input: &FormFields, state: &mut PipelineState) -> StepOutcome;
}

/// A kind of integration that can be registered.
pub trait IntegrationProvider: Send + Sync {
    /// Unique key, e.g. `slack`.
    fn key(&self) -> ProviderKey;

    /// Human-readable name, e.g. `Slack`.
    fn name(&self) -> &str;

    /// Steps run, in order, to set the integration up.
    fn pipeline(&self) -> Vec<Box<dyn PipelineView>>;

    /// Metadata to store once the pipeline completes.
    ///
    /// Must not be specific to one organization: an integration may be
    /// shared between several.
    fn build_metadata(&self, _state: &PipelineState) -> Map<String, JsonValue> {
        Map::new()
    }
}

/// Registered providers, in registration order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn IntegrationProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the providers that ship with switchyard.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ExampleProvider));
        registry
    }

    /// Adds a provider, replacing any previous one with the same key.
    pub fn register(&mut self, provider: Arc<dyn IntegrationProvider>) {
        let key = provider.key();
        match self.providers.iter_mut().find(|p| p.key() == key) {
            Some(existing) => *existing = provider,
            None => self.providers.push(provider),
        }
    }

    #[must_use]
    pub fn get(&self, key: &ProviderKey) -> Option<Arc<dyn IntegrationProvider>> {
        self.providers.iter().find(|p| p.key() == *key).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn IntegrationProvider>> {
        self.providers.iter()
    }

    /// The body served by the provider configuration endpoint.
    #[must_use]
    pub fn config(&self) -> ProviderConfig {
        ProviderConfig {
            providers: self
                .providers
                .iter()
                .map(|p| Provider {
                    id: p.key(),
                    name: p.name().to_string(),
                })
                .collect(),
        }
    }
}

/// Example provider, generally used for testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleProvider;

/// The example provider's only step: ask for a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleSetupView;

impl ExampleSetupView {
    const TEMPLATE: &'static str = r#"<form method="POST"><input type="text" name="name" /><button type="submit">Continue</button></form>"#;
}

impl PipelineView for ExampleSetupView {
    fn name(&self) -> &'static str {
        "example.setup"
    }

    fn dispatch(&self, input: &FormFields, state: &mut PipelineState) -> StepOutcome {
        match input.get("name").map(|n| n.trim()) {
            Some("") => StepOutcome::Fail("a name is required".to_string()),
            Some(name) => {
                state.bind("name", name);
                StepOutcome::Advance
            }
            None => StepOutcome::Render(Self::TEMPLATE.to_string()),
        }
    }
}

impl IntegrationProvider for ExampleProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::from_static("example")
    }

    fn name(&self) -> &str {
        "Example"
    }

    fn pipeline(&self) -> Vec<Box<dyn PipelineView>> {
        vec![Box::new(ExampleSetupView)]
    }

    fn build_metadata(&self, state: &PipelineState) -> Map<String, JsonValue> {
        let mut metadata = Map::new();
        if let Some(name) = state.fetch("name") {
            metadata.insert("name".to_string(), JsonValue::String(name.to_string()));
        }
        metadata
    }
}
