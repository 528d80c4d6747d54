//! Conversion options and configuration.

use crate::error::Result;
use crate::parser::ParserConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for converting a Markdown document.
///
/// Serialized field names are camelCase, and every field is optional in JSON:
///
/// ```
/// use mdreport::ConvertOptions;
///
/// let options = ConvertOptions::from_json_str(r#"{ "fixGDocs": true }"#).unwrap();
/// assert!(options.fix_gdocs);
/// assert!(options.process_footnotes);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Undo erroneous backslash escapes such as `1\.`
    pub fix_escapes: bool,

    /// Turn glyph bullets into list items
    pub smart_lists: bool,

    /// Resolve `[^id]` references into a bibliography
    pub process_footnotes: bool,

    /// Keep non-GSM characters (no transliteration)
    pub preserve_unicode: bool,

    /// Aggressive unescaping for Google Docs exports
    #[serde(rename = "fixGDocs")]
    pub fix_gdocs: bool,

    /// Canonicalize blank lines in the Markdown source
    pub normalize_spacing: bool,

    /// Insert newlines between sections of the rendered HTML
    pub section_spacing: bool,

    /// Split the first H1 or bold line off as the title
    pub extract_title: bool,

    /// Keyword tables and thresholds
    pub heuristics: Heuristics,
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Character normalization only: no escapes, footnotes, lists or spacing.
    pub fn minimal() -> Self {
        Self {
            fix_escapes: false,
            smart_lists: false,
            process_footnotes: false,
            fix_gdocs: false,
            normalize_spacing: false,
            section_spacing: false,
            extract_title: false,
            ..Self::default()
        }
    }

    /// The default pipeline.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Standard pipeline plus Google Docs clean-up.
    pub fn gdocs() -> Self {
        Self::default().with_fix_gdocs(true)
    }

    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Enable or disable escape repair.
    pub fn with_fix_escapes(mut self, enabled: bool) -> Self {
        self.fix_escapes = enabled;
        self
    }

    /// Enable or disable glyph bullet handling.
    pub fn with_smart_lists(mut self, enabled: bool) -> Self {
        self.smart_lists = enabled;
        self
    }

    /// Enable or disable footnote processing.
    pub fn with_footnotes(mut self, enabled: bool) -> Self {
        self.process_footnotes = enabled;
        self
    }

    /// Keep or transliterate non-GSM characters.
    pub fn with_preserve_unicode(mut self, preserve: bool) -> Self {
        self.preserve_unicode = preserve;
        self
    }

    /// Enable or disable Google Docs clean-up.
    pub fn with_fix_gdocs(mut self, enabled: bool) -> Self {
        self.fix_gdocs = enabled;
        self
    }

    /// Enable or disable Markdown spacing normalization.
    pub fn with_spacing(mut self, enabled: bool) -> Self {
        self.normalize_spacing = enabled;
        self
    }

    /// Enable or disable HTML section spacing.
    pub fn with_section_spacing(mut self, enabled: bool) -> Self {
        self.section_spacing = enabled;
        self
    }

    /// Enable or disable title extraction.
    pub fn with_title(mut self, enabled: bool) -> Self {
        self.extract_title = enabled;
        self
    }

    /// Replace the heuristics tables.
    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Parser configuration derived from these options.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default().with_smart_lists(self.smart_lists)
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            fix_escapes: true,
            smart_lists: true,
            process_footnotes: true,
            preserve_unicode: true,
            fix_gdocs: false,
            normalize_spacing: true,
            section_spacing: true,
            extract_title: true,
            heuristics: Heuristics::default(),
        }
    }
}

/// A search engine recognized in URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    /// Substring identifying the engine's search URLs
    pub pattern: String,

    /// Display name used instead of the URL
    pub name: String,
}

impl SearchEngine {
    /// Create a search engine entry.
    pub fn new(pattern: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            name: name.into(),
        }
    }
}

/// Lookup tables and thresholds used by the heuristic passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Heuristics {
    /// Paragraph openers that mark a bullet in an executive summary
    pub summary_keywords: Vec<String>,

    /// Heading text identifying the executive summary (case-insensitive)
    pub summary_heading: String,

    /// Characters treated as leading bullet glyphs
    pub bullet_glyphs: Vec<char>,

    /// Headings that introduce a works-cited section
    pub works_cited_headings: Vec<String>,

    /// Search engines shortened to a display name
    pub search_engines: Vec<SearchEngine>,

    /// Whole header words marking a demographic table
    pub demographic_header_words: Vec<String>,

    /// Heading words marking the next table as financial
    pub financial_heading_words: Vec<String>,

    /// Exact header names marking a financial table
    pub financial_header_names: Vec<String>,

    /// Printable page width used for row height estimates
    pub page_width_px: f64,

    /// Longest URL shown verbatim as link text
    pub max_url_display: usize,
}

impl Heuristics {
    /// Whether a heading text names a works-cited section.
    pub fn is_works_cited_heading(&self, text: &str) -> bool {
        self.works_cited_headings
            .iter()
            .any(|h| h.eq_ignore_ascii_case(text))
    }

    /// Whether a character is a configured bullet glyph.
    pub fn is_bullet(&self, c: char) -> bool {
        self.bullet_glyphs.contains(&c)
    }

    /// Display name of the search engine a URL belongs to.
    pub fn search_engine_name(&self, url: &str) -> Option<&str> {
        let lower = url.to_ascii_lowercase();
        self.search_engines
            .iter()
            .find(|e| lower.contains(&e.pattern))
            .map(|e| e.name.as_str())
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            summary_keywords: strings(&["Drive", "Increase", "Enhance", "Support", "Differentiate"]),
            summary_heading: "executive summary".to_string(),
            bullet_glyphs: vec!['•', '-', '–', '—'],
            works_cited_headings: strings(&[
                "Works cited",
                "References",
                "Footnotes",
                "Notes",
                "Bibliography",
            ]),
            search_engines: vec![
                SearchEngine::new("google.com/search", "Google Search"),
                SearchEngine::new("bing.com/search", "Bing Search"),
                SearchEngine::new("search.yahoo.com", "Yahoo Search"),
                SearchEngine::new("duckduckgo.com", "DuckDuckGo Search"),
            ],
            demographic_header_words: strings(&[
                "age",
                "demographic",
                "demographics",
                "group",
                "groups",
                "preference",
                "preferences",
            ]),
            financial_heading_words: strings(&["financial", "finance", "model", "revenue", "cost"]),
            financial_header_names: strings(&["roi", "cost", "price", "revenue", "margin"]),
            page_width_px: 700.0,
            max_url_display: 60,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
