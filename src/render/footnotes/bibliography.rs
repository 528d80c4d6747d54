//! Third pass: render the numbered bibliography and place it in the body.

use super::references::escape_html;
use super::find_works_cited;
use crate::model::{safe_id, FootnoteRegistry};
use crate::render::Heuristics;
use std::collections::HashSet;

/// Render the footnote section, or `None` for an empty registry.
pub fn render_bibliography(registry: &FootnoteRegistry) -> Option<String> {
    if registry.is_empty() {
        return None;
    }

    let mut rendered = HashSet::new();
    let mut items = Vec::with_capacity(registry.len());
    for id in registry.ordered_ids() {
        let safe = safe_id(id);
        if !rendered.insert(safe.clone()) {
            log::debug!("Footnote id {:?} collides with an earlier id, skipped", id);
            continue;
        }
        let Some(entry) = registry.get(id) else {
            continue;
        };

        let class = if entry.is_cited_again() {
            "footnote-item citation-item"
        } else {
            "footnote-item"
        };
        let content = match &entry.definition {
            Some(definition) => definition.html_content.clone(),
            None => format!(
                "<em>No footnote definition found for reference {}</em>",
                escape_html(id)
            ),
        };
        let backref = entry
            .first_occurrence()
            .map(|first| {
                format!(
                    " <a href=\"#fnref-{}-{}\" class=\"footnote-backref\" aria-label=\"Back to content\">↩</a>",
                    safe, first
                )
            })
            .unwrap_or_default();

        items.push(format!(
            "<li id=\"fn-{safe}\" class=\"{class}\">{id}. <span class=\"footnote-content\">{content}</span>{backref}</li>",
            safe = safe,
            class = class,
            id = escape_html(id),
            content = content,
            backref = backref,
        ));
    }

    Some(format!(
        "<div class=\"footnotes report-content-footnotes works-cited\">\n<hr>\n<ol class=\"footnote-list\">\n{}\n</ol>\n</div>",
        items.join("\n")
    ))
}

/// Put the section under the works-cited heading, replacing what was there,
/// or append it under a new `### References` heading.
pub fn insert_bibliography(text: &str, section: &str, heuristics: &Heuristics) -> String {
    match find_works_cited(text, heuristics) {
        Some(found) => {
            let head = &text[..found.body_start];
            let separator = if head.ends_with('\n') { "" } else { "\n" };
            let tail = &text[found.body_end..];
            let gap = if tail.is_empty() { "\n" } else { "\n\n" };
            format!("{}{}\n{}{}{}", head, separator, section, gap, tail)
        }
        None => format!(
            "{}\n\n### References\n\n{}\n",
            text.trim_end_matches('\n'),
            section
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FootnoteDefinition, FootnoteReference};

    fn reference(id: &str, n: usize, citation: bool) -> FootnoteReference {
        FootnoteReference {
            id: id.to_string(),
            occurrence_index: n,
            is_citation: citation,
        }
    }

    fn definition(id: &str, content: &str) -> FootnoteDefinition {
        FootnoteDefinition {
            id: id.to_string(),
            html_content: content.to_string(),
        }
    }

    #[test]
    fn test_empty_registry() {
        assert!(render_bibliography(&FootnoteRegistry::new()).is_none());
    }

    #[test]
    fn test_item_markup() {
        let registry = FootnoteRegistry::build(&[reference("1", 1, false)], vec![definition("1", "Note.")]);
        let html = render_bibliography(&registry).unwrap();
        assert!(html.contains(
            "<li id=\"fn-1\" class=\"footnote-item\">1. <span class=\"footnote-content\">Note.</span> <a href=\"#fnref-1-1\" class=\"footnote-backref\" aria-label=\"Back to content\">↩</a></li>"
        ));
        assert!(html.starts_with("<div class=\"footnotes report-content-footnotes works-cited\">\n<hr>\n<ol class=\"footnote-list\">"));
        assert!(!html.contains("\n\n"));
    }

    #[test]
    fn test_numeric_order_and_placeholder() {
        let refs = [reference("10", 1, false), reference("2", 2, false), reference("10", 3, true)];
        let registry = FootnoteRegistry::build(&refs, vec![definition("10", "Ten")]);
        let html = render_bibliography(&registry).unwrap();
        let two = html.find("id=\"fn-2\"").unwrap();
        let ten = html.find("id=\"fn-10\"").unwrap();
        assert!(two < ten);
        assert!(html.contains("<em>No footnote definition found for reference 2</em>"));
        assert!(html.contains("class=\"footnote-item citation-item\""));
        assert!(html.contains("href=\"#fnref-10-1\""));
    }

    #[test]
    fn test_definition_without_reference() {
        let registry = FootnoteRegistry::build(&[], vec![definition("a", "Orphan")]);
        let html = render_bibliography(&registry).unwrap();
        assert!(!html.contains("footnote-backref"));
    }

    #[test]
    fn test_colliding_safe_ids() {
        let refs = [reference("a.b", 1, false), reference("a-b", 2, false)];
        let registry = FootnoteRegistry::build(&refs, Vec::new());
        let html = render_bibliography(&registry).unwrap();
        assert_eq!(html.matches("id=\"fn-a-b\"").count(), 1);
    }

    #[test]
    fn test_replaces_works_cited_region() {
        let text = "Body\n\n## Works Cited\n\n1. Old\n2. Old\n\n## Appendix\nMore";
        let out = insert_bibliography(text, "<div>x</div>", &Heuristics::default());
        assert_eq!(out, "Body\n\n## Works Cited\n\n<div>x</div>\n\n## Appendix\nMore");
    }

    #[test]
    fn test_appends_references_heading() {
        let out = insert_bibliography("Body\n", "<div>x</div>", &Heuristics::default());
        assert_eq!(out, "Body\n\n### References\n\n<div>x</div>\n");
    }
}
