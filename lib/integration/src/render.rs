//! Render model for the integrations screen.
//!
//! These types carry everything the page needs to draw, so rendering rules
//! can be tested without a DOM.

use crate::model::Integration;
use crate::status::IntegrationStatus;
use switchyard_core::IntegrationId;

/// Heading of the empty-state panel.
pub const BLANK_SLATE_HEADING: &str = "Switchyard is better with friends";

/// Body text of the empty-state panel.
pub const BLANK_SLATE_TEXT: &str = "Integrations allow you to pull in things like repository data or sync with an external issue tracker.";

/// Documentation link shown in the empty-state panel.
pub const DOCS_URL: &str = "https://docs.switchyard.dev/learn/integrations/";

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    /// No integrations yet.
    BlankSlate,
    /// One row per integration, in list order.
    Table(Vec<IntegrationRow>),
}

/// A single table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationRow {
    pub id: IntegrationId,
    pub name: String,
    pub status: IntegrationStatus,
    /// Annotation after the name, if the status has one.
    pub status_label: Option<&'static str>,
    /// Whether the "Cancel" link for a queued deletion is shown.
    pub show_cancel: bool,
    /// Secondary line under the name.
    pub caption: Option<String>,
    /// Whether the delete button is disabled.
    pub delete_disabled: bool,
}

impl From<&Integration> for IntegrationRow {
    fn from(integration: &Integration) -> Self {
        Self {
            id: integration.id.clone(),
            name: integration.name.clone(),
            status: integration.status,
            status_label: integration.status.label(),
            show_cancel: integration.status.is_cancellable(),
            caption: integration.provider_name().map(str::to_string),
            delete_disabled: !integration.status.is_deletable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderRef;

    fn github(status: IntegrationStatus) -> Integration {
        Integration {
            id: "1".parse().expect("valid id"),
            name: "GitHub".to_string(),
            status,
            provider: Some(ProviderRef {
                id: "github".parse().expect("valid key"),
                name: Some("GitHub Apps".to_string()),
            }),
        }
    }

    #[test]
    fn visible_row_has_no_annotation_and_enabled_delete() {
        let row = IntegrationRow::from(&github(IntegrationStatus::Visible));
        assert_eq!(row.status_label, None);
        assert!(!row.show_cancel);
        assert!(!row.delete_disabled);
    }

    #[test]
    fn pending_deletion_row_offers_cancel() {
        let row = IntegrationRow::from(&github(IntegrationStatus::PendingDeletion));
        assert_eq!(row.status_label, Some("Deletion Queued"));
        assert!(row.show_cancel);
        assert!(row.delete_disabled);
    }

    #[test]
    fn in_progress_and_hidden_rows_disable_delete_without_cancel() {
        for status in [
            IntegrationStatus::DeletionInProgress,
            IntegrationStatus::Hidden,
            IntegrationStatus::Unknown,
        ] {
            let row = IntegrationRow::from(&github(status));
            assert!(!row.show_cancel, "{status}");
            assert!(row.delete_disabled, "{status}");
        }
    }

    #[test]
    fn caption_shows_provider_not_the_name_again() {
        let row = IntegrationRow::from(&github(IntegrationStatus::Visible));
        assert_eq!(row.caption.as_deref(), Some("GitHub Apps"));
    }
}
