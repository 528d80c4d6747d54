//! First pass: replace inline `[^id]` references with anchored markup.

use crate::model::{safe_id, FootnoteReference};
use crate::render::fences::map_unfenced;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\^([^\s\]]+)\]").unwrap());

/// Output of the reference scan.
#[derive(Debug, Clone, Default)]
pub struct ReferenceScan {
    /// Text with every reference replaced
    pub text: String,

    /// References in order of appearance
    pub references: Vec<FootnoteReference>,
}

/// Replace every `[^id]` not followed by `:` with a reference span.
///
/// Occurrence indices start at 1 and count across the whole document. A
/// reference to an id seen before is marked as a citation.
pub fn scan_references(text: &str) -> ReferenceScan {
    let mut references: Vec<FootnoteReference> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let text = map_unfenced(text, |chunk| {
        let mut out = String::with_capacity(chunk.len());
        let mut last = 0;
        for caps in RE_REFERENCE.captures_iter(chunk) {
            let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if chunk[whole.end()..].starts_with(':') {
                continue;
            }
            let id = id.as_str();
            let reference = FootnoteReference {
                id: id.to_string(),
                occurrence_index: references.len() + 1,
                is_citation: !seen.insert(id.to_string()),
            };
            out.push_str(&chunk[last..whole.start()]);
            out.push_str(&reference_markup(&reference));
            last = whole.end();
            log::trace!("Footnote reference [^{}] #{}", id, reference.occurrence_index);
            references.push(reference);
        }
        out.push_str(&chunk[last..]);
        out
    });

    ReferenceScan { text, references }
}

/// Inline markup of one reference.
pub fn reference_markup(reference: &FootnoteReference) -> String {
    let safe = safe_id(&reference.id);
    let class = if reference.is_citation {
        "footnote-ref citation-ref"
    } else {
        "footnote-ref"
    };
    format!(
        "<span id=\"fnref-{safe}-{n}\" class=\"{class}\"><a href=\"#fn-{safe}\">[{id}]</a></span>",
        safe = safe,
        n = reference.occurrence_index,
        class = class,
        id = escape_html(&reference.id),
    )
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
