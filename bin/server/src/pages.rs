//! Page components for the application.

pub mod integrations;

pub use integrations::IntegrationsPage;
