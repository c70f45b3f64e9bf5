//! Transient on-screen indicators ("toasts").
//!
//! Views report progress through the [`Notifier`] capability. The
//! [`IndicatorStore`] is the plain in-memory implementation; a UI layer wraps
//! it in whatever reactive container it renders from.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Shown while a mutating request is in flight.
pub const SAVING_MESSAGE: &str = "Saving changes..";

/// Shown when a mutating request fails.
pub const ERROR_MESSAGE: &str = "An error occurred.";

/// How long the error indicator stays up.
pub const ERROR_DURATION: Duration = Duration::from_millis(3000);

/// Handle returned by [`Notifier::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorId(u64);

/// Visual style of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Loading,
    Error,
}

impl IndicatorKind {
    /// CSS modifier class for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Error => "error",
        }
    }
}

/// A visible indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub id: IndicatorId,
    pub message: String,
    pub kind: IndicatorKind,
    /// `None` stays until removed.
    pub duration: Option<Duration>,
}

/// Sink for indicators.
pub trait Notifier {
    /// Shows an indicator and returns its handle.
    fn add(&self, message: &str, kind: IndicatorKind, duration: Option<Duration>) -> IndicatorId;

    /// Dismisses an indicator. Unknown handles are ignored.
    fn remove(&self, id: IndicatorId);
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn add(&self, message: &str, kind: IndicatorKind, duration: Option<Duration>) -> IndicatorId {
        (**self).add(message, kind, duration)
    }

    fn remove(&self, id: IndicatorId) {
        (**self).remove(id);
    }
}

/// Ordered collection of visible indicators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorStore {
    next_id: u64,
    items: Vec<Indicator>,
}

impl IndicatorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an indicator at the end and returns a copy of it.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: IndicatorKind,
        duration: Option<Duration>,
    ) -> Indicator {
        self.next_id += 1;
        let indicator = Indicator {
            id: IndicatorId(self.next_id),
            message: message.into(),
            kind,
            duration,
        };
        self.items.push(indicator.clone());
        indicator
    }

    /// Removes an indicator, returning whether it was present.
    pub fn dismiss(&mut self, id: IndicatorId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Indicators currently shown, oldest first.
    #[must_use]
    pub fn active(&self) -> &[Indicator] {
        &self.items
    }
}

impl Notifier for RefCell<IndicatorStore> {
    fn add(&self, message: &str, kind: IndicatorKind, duration: Option<Duration>) -> IndicatorId {
        self.borrow_mut().push(message, kind, duration).id
    }

    fn remove(&self, id: IndicatorId) {
        self.borrow_mut().dismiss(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_distinct_ids() {
        let mut store = IndicatorStore::new();
        let a = store.push("one", IndicatorKind::Loading, None);
        let b = store.push("two", IndicatorKind::Error, Some(ERROR_DURATION));
        assert_ne!(a.id, b.id);
        assert_eq!(store.active().len(), 2);
        assert_eq!(store.active()[1].duration, Some(Duration::from_millis(3000)));
    }

    #[test]
    fn dismiss_removes_only_the_given_indicator() {
        let mut store = IndicatorStore::new();
        let a = store.push("one", IndicatorKind::Loading, None);
        let b = store.push("two", IndicatorKind::Loading, None);

        assert!(store.dismiss(a.id));
        assert!(!store.dismiss(a.id));
        assert_eq!(store.active(), [b]);
    }

    #[test]
    fn refcell_store_is_a_notifier() {
        let store = Rc::new(RefCell::new(IndicatorStore::new()));
        let id = store.add(SAVING_MESSAGE, IndicatorKind::Loading, None);
        assert_eq!(store.borrow().active()[0].message, "Saving changes..");
        store.remove(id);
        assert!(store.borrow().active().is_empty());
    }
}
