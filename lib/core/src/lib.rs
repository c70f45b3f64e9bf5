//! Core domain types and utilities for switchyard.
//!
//! This crate provides the identifier types and the error-handling
//! foundation shared by the integration library and the server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{IntegrationId, OrganizationSlug, ParseKeyError, ProviderKey};
