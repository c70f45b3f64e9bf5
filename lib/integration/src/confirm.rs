//! Blocking yes/no confirmation.

/// Asks the user to confirm an action.
pub trait Confirm {
    /// Returns `true` if the user accepted `message`.
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Prompt shown before an integration is removed.
pub const DELETE_PROMPT: &str = "Are you sure you want to remove this integration?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_confirm() {
        let yes = |_: &str| true;
        let only_delete = |m: &str| m == DELETE_PROMPT;
        assert!(yes.confirm("anything"));
        assert!(only_delete.confirm(DELETE_PROMPT));
        assert!(!only_delete.confirm("something else"));
    }
}
