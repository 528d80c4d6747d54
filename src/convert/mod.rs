//! The conversion orchestrator.
//!
//! A [`Converter`] owns the two collaborators (Markdown parser and HTML
//! sanitizer) and runs the pipeline:
//!
//! ```text
//! spacing -> title -> cleanup -> footnotes -> parser -> sanitizer
//!         -> DOM -> tables -> footnote links -> summary clean-up -> HTML
//! ```
//!
//! # Example
//!
//! ```
//! use mdreport::{Converter, ConvertOptions};
//!
//! let converter = Converter::new(ConvertOptions::default());
//! let report = converter.convert("# Q3\n\nRevenue grew[^1].\n\n[^1]: Internal data.")?;
//! assert_eq!(report.title, "Q3");
//! assert!(report.html.contains("id=\"fn-1\""));
//! # Ok::<(), mdreport::Error>(())
//! ```

use crate::error::Result;
use crate::model::{Metadata, Report};
use crate::parser::{
    parse_html, AllowListSanitizer, ComrakParser, HtmlSanitizer, MarkdownParser, SanitizePolicy,
};
use crate::render::{
    add_section_spacing, clean_document, extract_title, fix_footnote_links, format_tables,
    normalize_markdown_spacing, process_footnotes, CleanupOptions, CleanupPipeline,
    ConversionStats, ConvertOptions, StyleSheet, DEFAULT_TITLE,
};
use rayon::prelude::*;
use std::sync::Arc;

/// Markdown after the text stages, with the extracted title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// Title, or [`DEFAULT_TITLE`] when extraction is off or found nothing
    pub title: String,

    /// Markdown ready for the parser
    pub markdown: String,

    pub footnote_references: usize,
    pub footnote_definitions: usize,
    pub missing_definitions: usize,
}

/// Runs the conversion pipeline with pluggable collaborators.
///
/// `Converter` is `Send + Sync` and holds no per-document state, so one
/// instance can serve many threads.
#[derive(Clone)]
pub struct Converter {
    parser: Arc<dyn MarkdownParser>,
    sanitizer: Arc<dyn HtmlSanitizer>,
    policy: SanitizePolicy,
    cleanup: Arc<CleanupPipeline>,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the comrak parser and the allow-list sanitizer.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            parser: Arc::new(ComrakParser::new()),
            sanitizer: Arc::new(AllowListSanitizer::new()),
            policy: SanitizePolicy::default(),
            cleanup: Arc::new(CleanupPipeline::new(CleanupOptions::from(&options))),
            options,
        }
    }

    /// Replace the Markdown parser.
    pub fn with_parser(mut self, parser: Arc<dyn MarkdownParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the HTML sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Replace the sanitize policy.
    pub fn with_policy(mut self, policy: SanitizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The options this converter runs with.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run the text stages only. Never fails.
    pub fn preprocess(&self, markdown: &str) -> Preprocessed {
        let options = &self.options;
        let heuristics = &options.heuristics;

        let mut text = if options.normalize_spacing {
            normalize_markdown_spacing(markdown, heuristics)
        } else {
            markdown.replace("\r\n", "\n")
        };

        let mut title = DEFAULT_TITLE.to_string();
        if options.extract_title {
            let split = extract_title(&text);
            title = split.title;
            text = split.body;
        }

        text = self.cleanup.process(&text);

        let mut preprocessed = Preprocessed {
            title,
            markdown: text,
            footnote_references: 0,
            footnote_definitions: 0,
            missing_definitions: 0,
        };
        if options.process_footnotes {
            let outcome = process_footnotes(&preprocessed.markdown, heuristics);
            preprocessed.markdown = outcome.text;
            preprocessed.footnote_references = outcome.references;
            preprocessed.footnote_definitions = outcome.definitions;
            preprocessed.missing_definitions = outcome.missing;
        }
        preprocessed
    }

    /// Convert one Markdown document to a report.
    ///
    /// Only a parser or sanitizer failure returns `Err`.
    pub fn convert(&self, markdown: &str) -> Result<Report> {
        let options = &self.options;
        let heuristics = &options.heuristics;
        let pre = self.preprocess(markdown);
        log::debug!(
            "Preprocessed {:?}: {} footnote references, {} definitions",
            pre.title,
            pre.footnote_references,
            pre.footnote_definitions
        );

        let rendered = self.parser.to_html(&pre.markdown, &options.parser_config())?;
        log::debug!("{} rendered {} bytes of HTML", self.parser.name(), rendered.len());
        let clean = self.sanitizer.sanitize(&rendered, &self.policy)?;
        log::debug!("{} returned {} bytes", self.sanitizer.name(), clean.len());

        let mut dom = parse_html(&clean);
        let tables = format_tables(&mut dom, heuristics);
        let links = fix_footnote_links(&mut dom, heuristics);
        let summary = clean_document(&mut dom, heuristics);
        log::debug!(
            "{} summary paragraphs converted, {} bullet glyphs removed",
            summary.converted_paragraphs,
            summary.removed_glyphs
        );

        let mut html = dom.to_html();
        if options.section_spacing {
            html = add_section_spacing(&html);
        }

        let mut stats = ConversionStats::new();
        stats.footnote_references = count(pre.footnote_references);
        stats.footnote_definitions = count(pre.footnote_definitions);
        stats.missing_definitions = count(pre.missing_definitions);
        stats.broken_footnote_links = count(links.broken_links);
        stats.tables_processed = count(tables.processed);
        stats.tables_skipped = count(tables.skipped);
        stats.document_font_scale = tables.font_scale;
        stats.count_words(&dom.text_content(dom.root()));

        Ok(Report {
            metadata: Metadata::new(pre.title.clone(), markdown.chars().count()),
            title: pre.title,
            html,
            markdown: pre.markdown,
            stats,
            styles: StyleSheet::report(tables.font_scale),
        })
    }

    /// Convert independent documents in parallel. Results keep input order.
    pub fn convert_many(&self, documents: &[&str]) -> Vec<Result<Report>> {
        documents.par_iter().map(|doc| self.convert(doc)).collect()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::ParserConfig;

    struct FailingParser;

    impl MarkdownParser for FailingParser {
        fn name(&self) -> &str {
            "failing"
        }

        fn to_html(&self, _markdown: &str, _config: &ParserConfig) -> Result<String> {
            Err(Error::Render("parser unavailable".to_string()))
        }
    }

    #[test]
    fn test_converter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    #[test]
    fn test_preprocess_stages() {
        let converter = Converter::default();
        let pre = converter.preprocess("# Title\r\n\r\n1\\. First item\r\n");
        assert_eq!(pre.title, "Title");
        assert_eq!(pre.markdown, "1. First item\n");
    }

    #[test]
    fn test_minimal_keeps_escapes() {
        let converter = Converter::new(ConvertOptions::minimal());
        let pre = converter.preprocess("1\\. item[^1]");
        assert_eq!(pre.markdown, "1\\. item[^1]");
        assert_eq!(pre.footnote_references, 0);
    }

    #[test]
    fn test_failing_parser() {
        let converter = Converter::default().with_parser(Arc::new(FailingParser));
        let err = converter.convert("text").unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_report_stats() {
        let report = Converter::default()
            .convert("Claim[^1] and[^2].\n\n[^1]: Source.\n")
            .unwrap();
        assert_eq!(report.stats.footnote_references, 2);
        assert_eq!(report.stats.footnote_definitions, 1);
        assert_eq!(report.stats.missing_definitions, 1);
        assert_eq!(report.stats.broken_footnote_links, 0);
        assert_eq!(report.stats.document_font_scale, 0.95);
        assert!(report.styles.rule(".footnote-ref").is_some());
    }

    #[test]
    fn test_convert_many_order() {
        let converter = Converter::default();
        let reports = converter.convert_many(&["# One", "# Two", "# Three"]);
        let titles: Vec<_> = reports.into_iter().map(|r| r.unwrap().title).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }
}
