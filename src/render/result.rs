//! Conversion statistics.

use serde::{Deserialize, Serialize};

/// Statistics collected during a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of `[^id]` references replaced
    pub footnote_references: u32,

    /// Number of definitions found (after first-wins deduplication)
    pub footnote_definitions: u32,

    /// Referenced ids that had no definition
    pub missing_definitions: u32,

    /// Footnote anchors whose target id does not exist
    pub broken_footnote_links: u32,

    /// Tables classified and formatted
    pub tables_processed: u32,

    /// Tables left untouched because planning failed
    pub tables_skipped: u32,

    /// Font multiplier applied to every table
    pub document_font_scale: f64,

    /// Approximate word count of the final text
    pub word_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count whitespace-separated words.
    pub fn count_words(&mut self, text: &str) {
        self.word_count = text.split_whitespace().count() as u32;
    }

    /// Merge statistics from another conversion.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.footnote_references += other.footnote_references;
        self.footnote_definitions += other.footnote_definitions;
        self.missing_definitions += other.missing_definitions;
        self.broken_footnote_links += other.broken_footnote_links;
        self.tables_processed += other.tables_processed;
        self.tables_skipped += other.tables_skipped;
        self.word_count += other.word_count;
        self.document_font_scale = self.document_font_scale.min(other.document_font_scale);
    }
}

impl Default for ConversionStats {
    fn default() -> Self {
        Self {
            footnote_references: 0,
            footnote_definitions: 0,
            missing_definitions: 0,
            broken_footnote_links: 0,
            tables_processed: 0,
            tables_skipped: 0,
            document_font_scale: 0.95,
            word_count: 0,
        }
    }
}

impl std::fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "footnotes: {} refs / {} defs ({} missing), tables: {} ({} skipped), font scale: {:.2}, words: {}",
            self.footnote_references,
            self.footnote_definitions,
            self.missing_definitions,
            self.tables_processed,
            self.tables_skipped,
            self.document_font_scale,
            self.word_count
        )
    }
}
