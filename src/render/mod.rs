//! Text and DOM stages of the conversion pipeline.
//!
//! The Markdown stages ([`cleanup`](CleanupPipeline), [`footnotes`], spacing
//! and title extraction) work on strings. The HTML stages ([`tables`],
//! [`footnotes::fix_footnote_links`], [`summary`]) work on an owned
//! [`Dom`](crate::model::Dom).

mod cleanup;
pub(crate) mod fences;
pub mod footnotes;
mod options;
mod result;
mod spacing;
mod style;
pub mod summary;
pub mod tables;
mod title;
pub mod urls;

pub use cleanup::{is_gsm_char, normalize_characters, to_gsm, CleanupOptions, CleanupPipeline};
pub use footnotes::{fix_footnote_links, process_footnotes, FootnoteOutcome, LinkReport};
pub use options::{ConvertOptions, Heuristics, SearchEngine};
pub use result::ConversionStats;
pub use spacing::{add_section_spacing, normalize_markdown_spacing};
pub use style::{StyleRule, StyleSheet};
pub use summary::{clean_document, SummaryReport};
pub use tables::{format_tables, TableLayout, TableSummary};
pub use title::{extract_title, TitleSplit, DEFAULT_TITLE};
pub use urls::{truncate_url, wikipedia_display, DEFAULT_MAX_URL_DISPLAY};
