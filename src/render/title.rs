//! Document title extraction.

use super::fences::unfenced_lines;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Title used when the document has none.
pub const DEFAULT_TITLE: &str = "Report";

static RE_TITLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:#[ \t]+(.*?)|(?:\*\*|__)(.*?)(?:\*\*|__))[ \t\r]*$").unwrap()
});

/// A document split into its title and the remaining body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleSplit {
    /// Title text without emphasis markers
    pub title: String,

    /// Markdown with the title line removed
    pub body: String,
}

/// Take the first H1 heading or fully bold line as the title.
///
/// The line is removed from the body together with the blank lines that
/// separated it from the text below. Without a candidate the title is
/// [`DEFAULT_TITLE`] and the body is the input unchanged.
pub fn extract_title(markdown: &str) -> TitleSplit {
    for (offset, line) in unfenced_lines(markdown) {
        let Some(caps) = RE_TITLE_LINE.captures(line) else {
            continue;
        };
        let raw = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let title = raw.replace("**", "").replace("__", "").trim().to_string();
        if title.is_empty() {
            continue;
        }

        let before = &markdown[..offset];
        let after = markdown[offset + line.len()..].trim_start_matches(['\r', '\n']);
        let body = if before.trim().is_empty() {
            after.to_string()
        } else {
            format!("{}{}", before, after)
        };
        return TitleSplit { title, body };
    }

    TitleSplit {
        title: DEFAULT_TITLE.to_string(),
        body: markdown.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_title() {
        let split = extract_title("# My Report\n\nBody text");
        assert_eq!(split.title, "My Report");
        assert_eq!(split.body, "Body text");
    }

    #[test]
    fn test_bold_title() {
        let split = extract_title("**Quarterly Review**\nFirst line\n");
        assert_eq!(split.title, "Quarterly Review");
        assert_eq!(split.body, "First line\n");
    }

    #[test]
    fn test_heading_with_emphasis() {
        let split = extract_title("# **Bold** Title  \ntext");
        assert_eq!(split.title, "Bold Title");
    }

    #[test]
    fn test_title_in_middle() {
        let split = extract_title("Intro\n\n# Title\n\nMore");
        assert_eq!(split.title, "Title");
        assert_eq!(split.body, "Intro\n\nMore");
    }

    #[test]
    fn test_h2_is_not_a_title() {
        let split = extract_title("## Section\n\ntext");
        assert_eq!(split.title, DEFAULT_TITLE);
        assert_eq!(split.body, "## Section\n\ntext");
    }

    #[test]
    fn test_empty_heading_skipped() {
        let split = extract_title("# \n# Real\n");
        assert_eq!(split.title, "Real");
    }

    #[test]
    fn test_heading_in_code_block_ignored() {
        let split = extract_title("```\n# not title\n```\n\n# Real\nbody");
        assert_eq!(split.title, "Real");
        assert_eq!(split.body, "```\n# not title\n```\n\nbody");
    }

    #[test]
    fn test_no_title() {
        let split = extract_title("");
        assert_eq!(split.title, "Report");
        assert_eq!(split.body, "");
    }
}
