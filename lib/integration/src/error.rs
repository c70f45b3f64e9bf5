//! Error types for the integration crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ApiError`: a request to the integrations API failed
//! - `PipelineError`: a setup pipeline could not start or continue

use switchyard_core::ProviderKey;
use std::fmt;

/// Errors from the integrations REST API.
///
/// The view treats every variant the same way ("request failed"); the
/// variants exist for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    Transport { method: &'static str, path: String, reason: String },
    /// The server answered with a non-2xx status.
    Status { method: &'static str, path: String, status: u16 },
    /// The response body could not be decoded.
    Decode { method: &'static str, path: String, reason: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport {
                method,
                path,
                reason,
            } => write!(f, "{method} {path} failed: {reason}"),
            Self::Status {
                method,
                path,
                status,
            } => write!(f, "{method} {path} returned status {status}"),
            Self::Decode {
                method,
                path,
                reason,
            } => write!(f, "{method} {path} returned an unreadable body: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors from the integration setup pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No provider is registered under the key.
    UnknownProvider { key: ProviderKey },
    /// A step rejected its input.
    StepFailed { provider: ProviderKey, step: String, message: String },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProvider { key } => write!(f, "unknown integration provider '{key}'"),
            Self::StepFailed {
                provider,
                step,
                message,
            } => write!(
                f,
                "there was an error setting up {provider} at step '{step}': {message}"
            ),
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    /// Message shown on the integrations page after setup fails.
    #[must_use]
    pub fn user_message(&self, provider_name: &str) -> String {
        match self {
            Self::UnknownProvider { .. } => {
                format!("There was an error setting up {provider_name}.")
            }
            Self::StepFailed { message, .. } => {
                format!("There was an error setting up {provider_name}: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_names_the_request() {
        let err = ApiError::Status {
            method: "DELETE",
            path: "/organizations/acme/integrations/1/".to_string(),
            status: 503,
        };
        let text = err.to_string();
        assert!(text.contains("DELETE /organizations/acme/integrations/1/"));
        assert!(text.contains("503"));
    }

    #[test]
    fn pipeline_error_display() {
        let err = PipelineError::UnknownProvider {
            key: "slack".parse().expect("valid key"),
        };
        assert!(err.to_string().contains("slack"));
    }

    #[test]
    fn step_failure_message_names_the_provider() {
        let err = PipelineError::StepFailed {
            provider: "example".parse().expect("valid key"),
            step: "name".to_string(),
            message: "a name is required".to_string(),
        };
        assert_eq!(
            err.user_message("Example"),
            "There was an error setting up Example: a name is required"
        );
    }
}
