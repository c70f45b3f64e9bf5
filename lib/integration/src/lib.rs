//! Organization integrations for switchyard.
//!
//! This crate provides:
//!
//! - **Model**: integrations, providers, and their lifecycle status
//! - **View controller**: the integrations screen without any UI code,
//!   driven through injected API, indicator, and confirmation capabilities
//! - **HTTP client**: a reqwest implementation of the integrations API
//! - **Providers**: the provider registry and multi-step setup pipeline

pub mod api;
pub mod client;
pub mod confirm;
pub mod error;
pub mod list;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod status;
pub mod view;

pub use api::IntegrationsApi;
pub use client::HttpIntegrationsApi;
pub use confirm::Confirm;
pub use error::{ApiError, PipelineError};
pub use list::IntegrationList;
pub use model::{Integration, Provider, ProviderConfig, ProviderRef, StatusChange, StatusUpdate};
pub use notify::{Indicator, IndicatorId, IndicatorKind, IndicatorStore, Notifier};
pub use pipeline::{FinishedSetup, Pipeline, PipelineProgress, PipelineSession};
pub use provider::{IntegrationProvider, PipelineView, ProviderRegistry};
pub use render::{IntegrationRow, ListBody};
pub use status::IntegrationStatus;
pub use view::{IntegrationsView, MemoryViewState, ViewState};
