//! Second pass: pull footnote definitions out of the body.

use super::find_works_cited;
use crate::model::FootnoteDefinition;
use crate::render::fences::unfenced_lines;
use crate::render::Heuristics;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[\^([^\s\]]+)\]:\s*(.*)$").unwrap());

static RE_NUMBERED_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(\d+)\.|\((\d+)\)\.?|\[(\d+)\]\.?)\s+(.+)$").unwrap()
});

static RE_BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:https?://|www\.)[^\s<>"]+"#).unwrap());

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Output of the definition pass.
#[derive(Debug, Clone, Default)]
pub struct DefinitionScan {
    /// Body with definition lines removed
    pub text: String,

    /// Definitions in order of appearance, first one per id
    pub definitions: Vec<FootnoteDefinition>,

    /// Definitions came from numbered items under a works-cited heading
    pub from_fallback: bool,
}

/// Extract `[^id]: text` definitions, falling back to numbered items in a
/// works-cited section when there are none.
pub fn extract_definitions(text: &str, heuristics: &Heuristics) -> DefinitionScan {
    let (definitions, consumed) = scan_definition_lines(text);

    if !definitions.is_empty() {
        let removed = remove_ranges(text, &consumed);
        let mut body = RE_BLANK_RUNS
            .replace_all(removed.trim_start_matches('\n'), "\n\n")
            .into_owned();
        if find_works_cited(&body, heuristics).is_none() {
            body = format!("{}\n\n### References\n", body.trim_end_matches('\n'));
        }
        log::debug!("Extracted {} footnote definitions", definitions.len());
        return DefinitionScan {
            text: body,
            definitions,
            from_fallback: false,
        };
    }

    let definitions = scan_works_cited_items(text, heuristics);
    if !definitions.is_empty() {
        log::debug!(
            "Extracted {} numbered sources from the works-cited section",
            definitions.len()
        );
    }
    DefinitionScan {
        text: text.to_string(),
        from_fallback: !definitions.is_empty(),
        definitions,
    }
}

/// Definitions plus the byte ranges of every line they occupied.
fn scan_definition_lines(text: &str) -> (Vec<FootnoteDefinition>, Vec<(usize, usize)>) {
    let mut definitions = Vec::new();
    let mut consumed = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<(String, String)> = None;
    let mut previous_end: Option<usize> = None;

    let mut finish = |current: &mut Option<(String, String)>, definitions: &mut Vec<_>| {
        if let Some((id, content)) = current.take() {
            if seen.insert(id.clone()) {
                definitions.push(FootnoteDefinition {
                    id,
                    html_content: autolink_urls(content.trim()),
                });
            } else {
                log::debug!("Ignoring duplicate definition for [^{}]", id);
            }
        }
    };

    for (offset, line) in unfenced_lines(text) {
        let end = line_end(text, offset, line);
        let contiguous = previous_end == Some(offset);
        previous_end = Some(end);

        if let Some(caps) = RE_DEFINITION.captures(line) {
            finish(&mut current, &mut definitions);
            current = Some((caps[1].to_string(), caps[2].trim().to_string()));
            consumed.push((offset, end));
        } else if line.trim().is_empty() || !contiguous {
            finish(&mut current, &mut definitions);
        } else if let Some((_, content)) = current.as_mut() {
            content.push(' ');
            content.push_str(line.trim());
            consumed.push((offset, end));
        }
    }
    finish(&mut current, &mut definitions);

    (definitions, consumed)
}

/// Numbered items between the works-cited heading and the next heading.
fn scan_works_cited_items(text: &str, heuristics: &Heuristics) -> Vec<FootnoteDefinition> {
    let Some(section) = find_works_cited(text, heuristics) else {
        return Vec::new();
    };
    let region = &text[section.body_start..section.body_end];

    let mut seen = HashSet::new();
    let mut definitions = Vec::new();
    for (_, line) in unfenced_lines(region) {
        let Some(caps) = RE_NUMBERED_SOURCE.captures(line) else {
            continue;
        };
        let Some(id) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };
        let id = id.as_str().to_string();
        if seen.insert(id.clone()) {
            definitions.push(FootnoteDefinition {
                id,
                html_content: autolink_urls(caps[4].trim()),
            });
        }
    }
    definitions
}

/// Wrap bare URLs that are not already part of a link in an anchor.
pub fn autolink_urls(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for m in RE_BARE_URL.find_iter(content) {
        let before = &content[..m.start()];
        if is_linked_context(before) {
            continue;
        }
        let (url, trailing) = split_trailing_punctuation(m.as_str());
        if url.is_empty() {
            continue;
        }
        let href = if url.starts_with("www.") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };
        out.push_str(&content[last..m.start()]);
        out.push_str(&format!(
            "<a href=\"{}\" class=\"url-only-link\" target=\"_blank\">{}</a>{}",
            href, url, trailing
        ));
        last = m.end();
    }
    out.push_str(&content[last..]);
    out
}

fn is_linked_context(before: &str) -> bool {
    if before.ends_with("href=\"")
        || before.ends_with("](")
        || before.ends_with('[')
        || before.ends_with('>')
        || before.ends_with('<')
        || before.ends_with("://")
    {
        return true;
    }
    // Inside an open <a> element
    let opened = before.matches("<a ").count() + before.matches("<a>").count();
    opened > before.matches("</a>").count()
}

fn split_trailing_punctuation(url: &str) -> (&str, &str) {
    let mut end = url.len();
    loop {
        let Some(last) = url[..end].chars().next_back() else {
            break;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => {
                let inner = &url[..end];
                inner.matches(')').count() > inner.matches('(').count()
            }
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    (&url[..end], &url[end..])
}

fn line_end(text: &str, offset: usize, line: &str) -> usize {
    let end = offset + line.len();
    if text[end..].starts_with('\n') {
        end + 1
    } else {
        end
    }
}

fn remove_ranges(text: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for &(start, end) in ranges {
        out.push_str(&text[last..start]);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> DefinitionScan {
        extract_definitions(text, &Heuristics::default())
    }

    #[test]
    fn test_definition_removed() {
        let scan = extract("Body.\n\n[^1]: Note.\n");
        assert_eq!(scan.definitions.len(), 1);
        assert_eq!(scan.definitions[0].id, "1");
        assert_eq!(scan.definitions[0].html_content, "Note.");
        assert_eq!(scan.text, "Body.\n\n### References\n");
    }

    #[test]
    fn test_first_definition_wins() {
        let scan = extract("x\n\n[^1]: A\n\n[^1]: B\n");
        assert_eq!(scan.definitions.len(), 1);
        assert_eq!(scan.definitions[0].html_content, "A");
    }

    #[test]
    fn test_continuation_lines() {
        let scan = extract("[^a]: First line\ncontinues here\n[^b]: Second\n\nAfter.");
        assert_eq!(scan.definitions[0].html_content, "First line continues here");
        assert_eq!(scan.definitions[1].html_content, "Second");
        assert!(scan.text.starts_with("After."));
        assert!(!scan.text.contains("continues"));
    }

    #[test]
    fn test_existing_heading_kept() {
        let scan = extract("Body\n\n## Works Cited\n\n[^1]: Source\n");
        assert_eq!(scan.text, "Body\n\n## Works Cited\n\n");
        assert!(!scan.from_fallback);
    }

    #[test]
    fn test_fallback_numbered_sources() {
        let text = "Body\n\n## **References:**\n\n1. Smith (2020)\n(2) Jones\n[3] Lee\n\n## Appendix\n4. Not a source\n";
        let scan = extract(text);
        assert!(scan.from_fallback);
        let ids: Vec<_> = scan.definitions.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(scan.text, text);
    }

    #[test]
    fn test_nothing_found() {
        let scan = extract("Just text.");
        assert!(scan.definitions.is_empty());
        assert_eq!(scan.text, "Just text.");
    }

    #[test]
    fn test_autolink() {
        assert_eq!(
            autolink_urls("See https://example.com/a."),
            "See <a href=\"https://example.com/a\" class=\"url-only-link\" target=\"_blank\">https://example.com/a</a>."
        );
        assert_eq!(
            autolink_urls("www.example.com"),
            "<a href=\"https://www.example.com\" class=\"url-only-link\" target=\"_blank\">www.example.com</a>"
        );
    }

    #[test]
    fn test_autolink_skips_links() {
        let md = "[Report](https://example.com/r)";
        assert_eq!(autolink_urls(md), md);
        let html = "<a href=\"https://example.com\">https://example.com</a>";
        assert_eq!(autolink_urls(html), html);
    }

    #[test]
    fn test_trailing_parenthesis() {
        assert_eq!(
            split_trailing_punctuation("https://en.wikipedia.org/wiki/Rust_(language))."),
            ("https://en.wikipedia.org/wiki/Rust_(language)", ").")
        );
    }
}
