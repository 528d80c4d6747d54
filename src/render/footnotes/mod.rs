//! Footnote and citation resolution.
//!
//! Three passes run over the Markdown before it is rendered:
//!
//! 1. [`scan_references`] replaces `[^id]` markers with anchored spans.
//! 2. [`extract_definitions`] removes `[^id]: text` lines, or reads numbered
//!    items from a works-cited section when the document has no definitions.
//! 3. [`render_bibliography`] builds the numbered list, which
//!    [`insert_bibliography`] places under the works-cited heading.
//!
//! The rendered HTML is repaired afterwards by [`fix_footnote_links`].

mod bibliography;
mod definitions;
mod links;
mod references;

pub use bibliography::{insert_bibliography, render_bibliography};
pub use definitions::{autolink_urls, extract_definitions, DefinitionScan};
pub use links::{fix_footnote_links, LinkReport};
pub use references::{reference_markup, scan_references, ReferenceScan};

use super::fences::unfenced_lines;
use super::spacing::atx_level;
use super::Heuristics;
use crate::model::FootnoteRegistry;
use crate::parser::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Result of a resolver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteOutcome {
    /// Markdown with references, definitions and bibliography rewritten
    pub text: String,

    /// Number of `[^id]` references
    pub references: usize,

    /// Number of definitions found
    pub definitions: usize,

    /// Ids referenced without a definition
    pub missing: usize,
}

impl FootnoteOutcome {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Run the three passes over `text`.
///
/// Never fails. A panic in any pass is caught, logged, and the input is
/// returned unmodified.
pub fn process_footnotes(text: &str, heuristics: &Heuristics) -> FootnoteOutcome {
    match catch_unwind(AssertUnwindSafe(|| resolve(text, heuristics))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            log::warn!(
                "Footnote processing failed, keeping original text: {}",
                panic_message(payload.as_ref())
            );
            FootnoteOutcome::unchanged(text)
        }
    }
}

fn resolve(text: &str, heuristics: &Heuristics) -> FootnoteOutcome {
    let scan = scan_references(text);
    let defs = extract_definitions(&scan.text, heuristics);
    let definitions = defs.definitions.len();
    let registry = FootnoteRegistry::build(&scan.references, defs.definitions);

    let body = match render_bibliography(&registry) {
        Some(section) => insert_bibliography(&defs.text, &section, heuristics),
        None => defs.text,
    };
    let missing = registry.missing_definitions();
    if missing > 0 {
        log::debug!("{} footnote references have no definition", missing);
    }

    FootnoteOutcome {
        text: body,
        references: scan.references.len(),
        definitions,
        missing,
    }
}

/// An ATX heading line located in a Markdown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeadingLine {
    /// Byte offset of the line
    pub start: usize,
    /// Byte offset just past the line and its newline
    pub end: usize,
    pub level: usize,
    /// Heading text without markers, emphasis or trailing colon
    pub text: String,
}

/// Byte ranges of a works-cited heading and the region under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WorksCitedSection {
    pub heading_start: usize,
    pub body_start: usize,
    /// Start of the next heading, or the end of the text
    pub body_end: usize,
}

pub(crate) fn heading_lines(text: &str) -> Vec<HeadingLine> {
    unfenced_lines(text)
        .into_iter()
        .filter_map(|(start, line)| {
            let level = atx_level(line)?;
            let mut end = start + line.len();
            if text[end..].starts_with('\n') {
                end += 1;
            }
            Some(HeadingLine {
                start,
                end,
                level,
                text: heading_text(line),
            })
        })
        .collect()
}

fn heading_text(line: &str) -> String {
    let stripped = line
        .trim_start()
        .trim_start_matches('#')
        .trim()
        .trim_end_matches('#')
        .replace("**", "")
        .replace("__", "");
    stripped.trim().trim_end_matches(':').trim().to_string()
}

pub(crate) fn find_works_cited(text: &str, heuristics: &Heuristics) -> Option<WorksCitedSection> {
    let headings = heading_lines(text);
    let index = headings
        .iter()
        .position(|h| heuristics.is_works_cited_heading(&h.text))?;
    let heading = &headings[index];
    let body_end = headings
        .get(index + 1)
        .map_or(text.len(), |next| next.start);

    Some(WorksCitedSection {
        heading_start: heading.start,
        body_start: heading.end,
        body_end,
    })
}
