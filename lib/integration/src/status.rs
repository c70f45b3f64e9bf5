//! Integration lifecycle status.
//!
//! Status is owned by the server. Clients only display whatever status they
//! were last told; transitions are enforced server-side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    /// Active and shown normally.
    Visible,
    /// Disabled by the organization.
    Hidden,
    /// Removal requested; can still be cancelled.
    PendingDeletion,
    /// Removal underway; can no longer be cancelled.
    DeletionInProgress,
    /// A value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl IntegrationStatus {
    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::PendingDeletion => "pending_deletion",
            Self::DeletionInProgress => "deletion_in_progress",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a wire name, mapping anything unrecognized to `Unknown`.
    #[must_use]
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "visible" => Self::Visible,
            "hidden" => Self::Hidden,
            "pending_deletion" => Self::PendingDeletion,
            "deletion_in_progress" => Self::DeletionInProgress,
            _ => Self::Unknown,
        }
    }

    /// Human-readable annotation shown next to the integration name.
    ///
    /// `Visible` and `Unknown` carry no annotation.
    #[must_use]
    pub const fn label(&self) -> Option<&'static str> {
        match self {
            Self::PendingDeletion => Some("Deletion Queued"),
            Self::DeletionInProgress => Some("Deletion in Progress"),
            Self::Hidden => Some("Disabled"),
            Self::Visible | Self::Unknown => None,
        }
    }

    /// Whether a queued deletion can still be cancelled.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::PendingDeletion)
    }

    /// Whether the delete action is enabled.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        matches!(self, Self::Visible)
    }
}

impl fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
