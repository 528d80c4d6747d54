//! Report-level types.

use crate::error::{Error, Result};
use crate::render::{ConversionStats, StyleSheet};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Metadata of a converted report.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Title taken from the first heading or bold line
    pub title: String,

    /// When the conversion ran
    pub generated: DateTime<Utc>,

    /// Number of characters in the raw input
    pub source_chars: usize,
}

impl Metadata {
    /// Create metadata stamped with the current time.
    pub fn new(title: impl Into<String>, source_chars: usize) -> Self {
        Self {
            title: title.into(),
            generated: Utc::now(),
            source_chars,
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new("Report", 0)
    }
}

/// Output of one conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Extracted title
    pub title: String,

    /// Final sanitized HTML fragment
    pub html: String,

    /// Markdown as handed to the parser
    pub markdown: String,

    /// Report metadata
    pub metadata: Metadata,

    /// Counters collected along the pipeline
    pub stats: ConversionStats,

    /// Style directives for the classes used in `html`
    pub styles: StyleSheet,
}

impl Report {
    /// Serialize the report as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };
        result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
    }

    /// Wrap the fragment in a complete HTML page with the styles in `<head>`.
    pub fn standalone_html(&self) -> String {
        let title = escape(&self.title);
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n\
             <header class=\"report-header\">\n<h1>{title}</h1>\n\
             <p class=\"report-date\">{date}</p>\n</header>\n\
             <main class=\"report-content\">\n{body}\n</main>\n</body>\n</html>\n",
            title = title,
            css = self.styles.to_css(),
            date = self.metadata.generated.format("%B %-d, %Y"),
            body = self.html,
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            title: "Q3 <Review>".to_string(),
            html: "<p>Body</p>".to_string(),
            markdown: "Body\n".to_string(),
            metadata: Metadata::new("Q3 <Review>", 5),
            stats: ConversionStats::default(),
            styles: StyleSheet::default(),
        }
    }

    #[test]
    fn test_standalone_html() {
        let page = report().standalone_html();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Q3 &lt;Review&gt;</title>"));
        assert!(page.contains("<p>Body</p>"));
    }

    #[test]
    fn test_report_json() {
        let json = report().to_json(JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"title\":\"Q3 <Review>\""));
        assert!(json.contains("\"generated\""));
        assert!(json.contains("\"tables_processed\":0"));
    }

    #[test]
    fn test_report_json_pretty() {
        let json = report().to_json(JsonFormat::Pretty).unwrap();
        assert!(json.contains("\n  \"title\""));
    }
}
