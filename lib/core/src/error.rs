//! Error handling foundation for switchyard.
//!
//! Only the `Result` alias lives here. Each crate owns its error enums and
//! wraps them in a rootcause [`Report`], attaching `.context()` as errors
//! cross layer boundaries.

use rootcause::Report;

/// Result carrying a rootcause report whose current context is `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
