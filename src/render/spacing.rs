//! Blank-line canonicalization for Markdown and section spacing for HTML.

use super::fences::map_unfenced;
use super::Heuristics;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\. ").unwrap());

static RE_HEADING_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</h([1-3])>\s*<p\b").unwrap());
static RE_LIST_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</(ul|ol)>\s*<h([1-3])\b").unwrap());
static RE_TABLE_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"</table>\s*<p\b").unwrap());
static RE_PARAGRAPH_TABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</p>\s*<table\b").unwrap());
static RE_RULE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"<hr\s*/?>\s*<h").unwrap());
static RE_PARAGRAPH_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</p>\s*<hr\b").unwrap());
static RE_PARAGRAPHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"</p>\s*<p\b").unwrap());

/// Canonicalize blank lines in a Markdown document.
///
/// Steps, none of which touch fenced code:
///
/// 1. CRLF line endings become LF.
/// 2. Lines of the executive summary that start with a summary keyword become
///    bullets.
/// 3. Runs of blank lines collapse to one.
/// 4. A bullet or numbered item directly below a non-empty line gets a blank
///    line in front of it.
/// 5. Leading newlines go and the text ends with exactly one newline.
///
/// The function is idempotent.
pub fn normalize_markdown_spacing(text: &str, heuristics: &Heuristics) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = text.replace("\r\n", "\n");
    let summary_heading = heuristics.summary_heading.to_lowercase();
    let mut in_summary = false;

    let spaced = map_unfenced(&text, |chunk| {
        let mut out = String::with_capacity(chunk.len());
        let mut previous_blank = true;
        let mut previous_empty = true;

        for line in chunk.split_inclusive('\n') {
            let (content, newline) = match line.strip_suffix('\n') {
                Some(content) => (content, "\n"),
                None => (line, ""),
            };

            if let Some(level) = atx_level(content) {
                if level <= 3 {
                    in_summary = content.to_lowercase().contains(&summary_heading);
                }
            }

            let content = if in_summary {
                bulletize_summary_line(content, heuristics)
            } else {
                content.to_string()
            };

            if content.is_empty() {
                if !previous_blank {
                    out.push_str(newline);
                }
                previous_blank = true;
                previous_empty = true;
                continue;
            }

            if is_list_item(&content) && !previous_empty {
                out.push('\n');
            }
            out.push_str(&content);
            out.push_str(newline);
            previous_blank = false;
            previous_empty = false;
        }
        out
    });

    let trimmed = spaced.trim_start_matches('\n').trim_end_matches('\n');
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{}\n", trimmed)
}

/// Insert newlines between the sections of a serialized HTML fragment.
pub fn add_section_spacing(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let mut content = RE_HEADING_PARAGRAPH
        .replace_all(html, "</h$1>\n<p")
        .into_owned();
    content = RE_LIST_HEADING
        .replace_all(&content, "</$1>\n\n<h$2")
        .into_owned();
    content = RE_TABLE_PARAGRAPH
        .replace_all(&content, "</table>\n<p")
        .into_owned();
    content = RE_PARAGRAPH_TABLE
        .replace_all(&content, "</p>\n<table")
        .into_owned();
    content = RE_RULE_HEADING.replace_all(&content, "<hr>\n<h").into_owned();
    content = RE_PARAGRAPH_RULE
        .replace_all(&content, "</p>\n<hr")
        .into_owned();
    RE_PARAGRAPHS.replace_all(&content, "</p>\n<p").into_owned()
}

/// Level of an ATX heading line.
pub(crate) fn atx_level(line: &str) -> Option<usize> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match rest[level..].chars().next() {
        None | Some(' ') | Some('\t') => Some(level),
        _ => None,
    }
}

fn bulletize_summary_line(line: &str, heuristics: &Heuristics) -> String {
    let trimmed = line.trim();
    let keyword = heuristics
        .summary_keywords
        .iter()
        .any(|k| !k.is_empty() && trimmed.starts_with(k.as_str()));
    if keyword && !trimmed.starts_with("- ") && !trimmed.starts_with("* ") {
        format!("- {}", trimmed)
    } else {
        line.to_string()
    }
}

fn is_list_item(line: &str) -> bool {
    line.starts_with("- ") || RE_NUMBERED_ITEM.is_match(line)
}
