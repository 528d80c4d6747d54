//! Markdown rendering and HTML sanitizing collaborators.
//!
//! The conversion pipeline only talks to these through the [`MarkdownParser`]
//! and [`HtmlSanitizer`] traits, isolating the concrete libraries (comrak and
//! html5ever) from the cleanup logic.

mod html;
mod markdown;
mod options;
mod sanitize;

pub use html::parse_html;
pub use markdown::ComrakParser;
pub use options::{ParserConfig, SanitizePolicy, REQUIRED_ATTRIBUTES};
pub use sanitize::{AllowListSanitizer, SanitizeAction, SanitizeSummary};

use crate::error::Result;
use std::any::Any;

/// Renders Markdown text to an HTML fragment.
pub trait MarkdownParser: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Render a Markdown document to an HTML fragment.
    fn to_html(&self, markdown: &str, config: &ParserConfig) -> Result<String>;
}

/// Cleans untrusted HTML before it is formatted.
pub trait HtmlSanitizer: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Return a sanitized copy of `html`.
    fn sanitize(&self, html: &str, policy: &SanitizePolicy) -> Result<String>;
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let caught = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom 1");

        let caught = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "static");
    }
}
