//! # mdreport
//!
//! Turn Markdown copied out of chat assistants and document editors into
//! clean, print-ready HTML reports.
//!
//! Copied Markdown tends to arrive damaged: escaped list numbers, typographic
//! quotes, footnotes scattered across the text, and wide tables that overflow
//! the page. This library repairs the text, resolves footnotes into a works
//! cited list, renders and sanitizes the HTML, and formats tables for print.
//!
//! ## Quick Start
//!
//! ```
//! use mdreport::convert;
//!
//! fn main() -> mdreport::Result<()> {
//!     let report = convert("# Market Update\n\nSales rose[^1].\n\n[^1]: Q3 filing.")?;
//!     assert_eq!(report.title, "Market Update");
//!     assert!(report.html.contains("class=\"footnote-ref\""));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Character clean-up**: smart quotes, dashes, ellipses and invisible
//!   characters normalized, over-escaped Markdown repaired
//! - **Footnotes**: references, definitions and works cited lists merged into
//!   one linked bibliography
//! - **Tables**: classified by content, sized per column, scaled to fit
//! - **Sanitizing**: allow-list HTML clean-up after rendering
//! - **Parallel batches**: independent documents converted with Rayon

pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{Converter, Preprocessed};
pub use error::{Error, Result, TableError};
pub use model::{
    Alignment, ColumnType, Dom, FootnoteRegistry, JsonFormat, Metadata, NodeId, Report, TableKind,
    TableModel,
};
pub use parser::{
    AllowListSanitizer, ComrakParser, HtmlSanitizer, MarkdownParser, ParserConfig, SanitizePolicy,
};
pub use render::{
    ConversionStats, ConvertOptions, Heuristics, SearchEngine, StyleSheet, TitleSplit,
};

use std::sync::Arc;

/// Convert Markdown to a report with the default options.
///
/// # Example
///
/// ```
/// let report = mdreport::convert("**Weekly Notes**\n\nAll good.")?;
/// assert_eq!(report.title, "Weekly Notes");
/// assert!(report.html.contains("<p>All good.</p>"));
/// # Ok::<(), mdreport::Error>(())
/// ```
pub fn convert(markdown: &str) -> Result<Report> {
    Converter::default().convert(markdown)
}

/// Convert Markdown to a report with custom options.
///
/// # Example
///
/// ```
/// use mdreport::{convert_with_options, ConvertOptions};
///
/// let options = ConvertOptions::new().with_footnotes(false);
/// let report = convert_with_options("Text[^1]", &options)?;
/// assert!(!report.html.contains("footnote-ref"));
/// # Ok::<(), mdreport::Error>(())
/// ```
pub fn convert_with_options(markdown: &str, options: &ConvertOptions) -> Result<Report> {
    Converter::new(options.clone()).convert(markdown)
}

/// Run the text stages only and return the Markdown the parser would see.
///
/// # Example
///
/// ```
/// use mdreport::{preprocess, ConvertOptions};
///
/// let markdown = preprocess("1\\. \u{201C}Quoted\u{201D}", &ConvertOptions::default());
/// assert_eq!(markdown, "1. \"Quoted\"\n");
/// ```
pub fn preprocess(markdown: &str, options: &ConvertOptions) -> String {
    Converter::new(options.clone()).preprocess(markdown).markdown
}

/// Split the title off a Markdown document.
///
/// # Example
///
/// ```
/// let split = mdreport::extract_title("# Summary\n\nBody");
/// assert_eq!(split.title, "Summary");
/// assert_eq!(split.body, "Body");
/// ```
pub fn extract_title(markdown: &str) -> TitleSplit {
    render::extract_title(markdown)
}

/// Normalize line endings, list spacing and heading spacing.
pub fn normalize_markdown_spacing(markdown: &str) -> String {
    render::normalize_markdown_spacing(markdown, &Heuristics::default())
}

/// Convert independent documents in parallel, keeping input order.
pub fn convert_many(documents: &[&str], options: &ConvertOptions) -> Vec<Result<Report>> {
    Converter::new(options.clone()).convert_many(documents)
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```
/// use mdreport::MdReport;
///
/// let report = MdReport::new()
///     .with_footnotes(true)
///     .with_fix_gdocs(true)
///     .convert("# Notes\n\nSee below[^a].\n\n[^a]: Appendix.")?;
/// assert_eq!(report.stats.footnote_definitions, 1);
/// # Ok::<(), mdreport::Error>(())
/// ```
pub struct MdReport {
    options: ConvertOptions,
    parser: Option<Arc<dyn MarkdownParser>>,
    sanitizer: Option<Arc<dyn HtmlSanitizer>>,
}

impl MdReport {
    /// Create a builder with the default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            parser: None,
            sanitizer: None,
        }
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Repair over-escaped Markdown.
    pub fn with_fix_escapes(mut self, enabled: bool) -> Self {
        self.options = self.options.with_fix_escapes(enabled);
        self
    }

    /// Repair list markers that lost their spacing.
    pub fn with_smart_lists(mut self, enabled: bool) -> Self {
        self.options = self.options.with_smart_lists(enabled);
        self
    }

    /// Resolve footnotes into a works cited list.
    pub fn with_footnotes(mut self, enabled: bool) -> Self {
        self.options = self.options.with_footnotes(enabled);
        self
    }

    /// Keep Unicode punctuation instead of mapping it to ASCII.
    pub fn with_preserve_unicode(mut self, preserve: bool) -> Self {
        self.options = self.options.with_preserve_unicode(preserve);
        self
    }

    /// Apply the Google Docs specific fixes.
    pub fn with_fix_gdocs(mut self, enabled: bool) -> Self {
        self.options = self.options.with_fix_gdocs(enabled);
        self
    }

    /// Normalize Markdown spacing before rendering.
    pub fn with_spacing(mut self, enabled: bool) -> Self {
        self.options = self.options.with_spacing(enabled);
        self
    }

    /// Mark paragraphs following headings in the final HTML.
    pub fn with_section_spacing(mut self, enabled: bool) -> Self {
        self.options = self.options.with_section_spacing(enabled);
        self
    }

    /// Extract the title from the first heading or bold line.
    pub fn with_title(mut self, enabled: bool) -> Self {
        self.options = self.options.with_title(enabled);
        self
    }

    /// Replace the content heuristics.
    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.options = self.options.with_heuristics(heuristics);
        self
    }

    /// Use a different Markdown parser.
    pub fn with_parser(mut self, parser: Arc<dyn MarkdownParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Use a different HTML sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// The options collected so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Build the converter.
    pub fn build(self) -> Converter {
        let mut converter = Converter::new(self.options);
        if let Some(parser) = self.parser {
            converter = converter.with_parser(parser);
        }
        if let Some(sanitizer) = self.sanitizer {
            converter = converter.with_sanitizer(sanitizer);
        }
        converter
    }

    /// Build the converter and convert one document.
    pub fn convert(self, markdown: &str) -> Result<Report> {
        self.build().convert(markdown)
    }
}

impl Default for MdReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSanitizer;

    impl HtmlSanitizer for FailingSanitizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn sanitize(&self, _html: &str, _policy: &SanitizePolicy) -> Result<String> {
            Err(Error::Sanitize("unavailable".to_string()))
        }
    }

    #[test]
    fn test_builder_default() {
        let builder = MdReport::default();
        assert!(builder.options().process_footnotes);
        assert!(builder.options().fix_escapes);
        assert!(!builder.options().fix_gdocs);
    }

    #[test]
    fn test_builder_chained() {
        let builder = MdReport::new()
            .with_footnotes(false)
            .with_preserve_unicode(true)
            .with_fix_gdocs(true)
            .with_title(false);
        let options = builder.options();
        assert!(!options.process_footnotes);
        assert!(options.preserve_unicode);
        assert!(options.fix_gdocs);
        assert!(!options.extract_title);
    }

    #[test]
    fn test_builder_without_title() {
        let report = MdReport::new().with_title(false).convert("# Heading").unwrap();
        assert_eq!(report.title, render::DEFAULT_TITLE);
        assert!(report.html.contains("<h1>Heading</h1>"));
    }

    #[test]
    fn test_builder_failing_sanitizer() {
        let result = MdReport::new()
            .with_sanitizer(Arc::new(FailingSanitizer))
            .convert("text");
        assert!(matches!(result, Err(Error::Sanitize(_))));
    }

    #[test]
    fn test_convert_empty() {
        let report = convert("").unwrap();
        assert_eq!(report.title, render::DEFAULT_TITLE);
        assert!(report.html.trim().is_empty());
        assert_eq!(report.stats.word_count, 0);
    }

    #[test]
    fn test_preprocess_strips_title() {
        let markdown = preprocess("# Title\n\nBody text", &ConvertOptions::default());
        assert_eq!(markdown, "Body text\n");
    }

    #[test]
    fn test_convert_many_matches_single() {
        let options = ConvertOptions::default();
        let docs = ["# A\n\nOne", "# B\n\nTwo"];
        let many = convert_many(&docs, &options);
        for (doc, result) in docs.iter().zip(many) {
            let single = convert_with_options(doc, &options).unwrap();
            assert_eq!(result.unwrap().html, single.html);
        }
    }
}
