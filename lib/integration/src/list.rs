//! The in-memory integration list shown by the view.

use crate::model::{Integration, StatusChange};
use crate::render::{IntegrationRow, ListBody};

/// Integrations in display order.
///
/// Order is whatever the server returned, except that
/// [`insert_sorted`](Self::insert_sorted) re-sorts by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationList {
    items: Vec<Integration>,
}

impl IntegrationList {
    #[must_use]
    pub fn new(items: Vec<Integration>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[Integration] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Overwrites the status of every item whose id matches `change.id`.
    ///
    /// No other field is touched and membership never changes. Returns
    /// whether anything matched.
    pub fn apply_status(&mut self, change: &StatusChange) -> bool {
        let mut matched = false;
        for item in self.items.iter_mut().filter(|item| item.id == change.id) {
            item.status = change.status;
            matched = true;
        }
        matched
    }

    /// Appends `integration`, then stably sorts the whole list by name.
    pub fn insert_sorted(&mut self, integration: Integration) {
        self.items.push(integration);
        self.items.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Builds the render model for the current contents.
    #[must_use]
    pub fn body(&self) -> ListBody {
        if self.items.is_empty() {
            return ListBody::BlankSlate;
        }
        ListBody::Table(self.items.iter().map(IntegrationRow::from).collect())
    }
}

impl From<Vec<Integration>> for IntegrationList {
    fn from(items: Vec<Integration>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::IntegrationStatus;

    fn integration(id: &str, name: &str, status: IntegrationStatus) -> Integration {
        Integration {
            id: id.parse().expect("valid id"),
            name: name.to_string(),
            status,
            provider: None,
        }
    }

    #[test]
    fn apply_status_touches_only_the_matching_item() {
        let mut list = IntegrationList::new(vec![
            integration("1", "GitHub", IntegrationStatus::Visible),
            integration("2", "Slack", IntegrationStatus::Visible),
        ]);

        let matched = list.apply_status(&StatusChange {
            id: "1".parse().expect("valid id"),
            status: IntegrationStatus::PendingDeletion,
        });

        assert!(matched);
        assert_eq!(
            list.items()[0],
            integration("1", "GitHub", IntegrationStatus::PendingDeletion)
        );
        assert_eq!(
            list.items()[1],
            integration("2", "Slack", IntegrationStatus::Visible)
        );
    }

    #[test]
    fn apply_status_for_missing_id_changes_nothing() {
        let mut list =
            IntegrationList::new(vec![integration("1", "GitHub", IntegrationStatus::Visible)]);
        let before = list.clone();

        let matched = list.apply_status(&StatusChange {
            id: "9".parse().expect("valid id"),
            status: IntegrationStatus::Hidden,
        });

        assert!(!matched);
        assert_eq!(list, before);
    }

    #[test]
    fn apply_status_does_not_reorder() {
        let mut list = IntegrationList::new(vec![
            integration("2", "Slack", IntegrationStatus::Visible),
            integration("1", "GitHub", IntegrationStatus::Visible),
        ]);
        list.apply_status(&StatusChange {
            id: "1".parse().expect("valid id"),
            status: IntegrationStatus::Hidden,
        });
        assert_eq!(list.items()[0].name, "Slack");
    }

    #[test]
    fn insertions_keep_the_list_sorted_by_name() {
        let mut list = IntegrationList::default();
        for (id, name) in [("1", "Slack"), ("2", "Asana"), ("3", "GitHub"), ("4", "Bitbucket")] {
            list.insert_sorted(integration(id, name, IntegrationStatus::Visible));
            let names: Vec<_> = list.items().iter().map(|i| i.name.as_str()).collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
        }
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn insertion_sort_is_stable_for_equal_names() {
        let mut list = IntegrationList::new(vec![integration(
            "1",
            "GitHub",
            IntegrationStatus::Visible,
        )]);
        list.insert_sorted(integration("2", "GitHub", IntegrationStatus::Hidden));
        let ids: Vec<_> = list.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn empty_list_renders_blank_slate() {
        assert_eq!(IntegrationList::default().body(), ListBody::BlankSlate);
    }
}
