//! Default Markdown parser backed by comrak.

use super::{panic_message, MarkdownParser, ParserConfig};
use crate::error::{Error, Result};
use crate::render::fences::map_unfenced;
use comrak::{markdown_to_html, Options};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::panic::{catch_unwind, AssertUnwindSafe};

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^( {0,3}#{1,6}[ \t]+)(.*)$").unwrap());

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").unwrap());

static GLYPH_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[•◦▪‣][ \t]+").unwrap());

/// [`MarkdownParser`] using comrak with raw HTML pass-through.
///
/// Raw HTML must survive rendering untouched because the footnote resolver
/// emits its markup before the parser runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakParser;

impl ComrakParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Source rewrites standing in for renderer overrides.
    pub fn prepare(&self, markdown: &str, config: &ParserConfig) -> String {
        map_unfenced(markdown, |chunk| {
            let mut text = chunk.to_string();
            if config.clean_heading_emphasis {
                text = ATX_HEADING
                    .replace_all(&text, |caps: &Captures| {
                        format!("{}{}", &caps[1], caps[2].replace("**", "").replace("__", ""))
                    })
                    .into_owned();
            }
            if config.collapse_url_links {
                text = MARKDOWN_LINK
                    .replace_all(&text, |caps: &Captures| {
                        let (label, url) = (&caps[1], &caps[2]);
                        if label == url && is_web_url(url) {
                            format!("<{}>", url)
                        } else {
                            caps[0].to_string()
                        }
                    })
                    .into_owned();
            }
            if config.smart_lists {
                text = GLYPH_BULLET.replace_all(&text, "${1}- ").into_owned();
            }
            text
        })
    }

    fn options(config: &ParserConfig) -> Options<'static> {
        let mut options = Options::default();
        options.extension.table = config.gfm;
        options.extension.strikethrough = config.gfm;
        options.extension.autolink = config.gfm;
        options.extension.tasklist = config.gfm;
        options.extension.tagfilter = false;
        options.parse.smart = config.smart_punctuation;
        options.render.hardbreaks = config.hard_breaks;
        options.render.unsafe_ = true;
        options
    }
}

impl MarkdownParser for ComrakParser {
    fn name(&self) -> &str {
        "comrak"
    }

    fn to_html(&self, markdown: &str, config: &ParserConfig) -> Result<String> {
        let source = self.prepare(markdown, config);
        let options = Self::options(config);
        catch_unwind(AssertUnwindSafe(|| markdown_to_html(&source, &options)))
            .map_err(|payload| Error::Render(panic_message(payload.as_ref())))
    }
}

fn is_web_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        ComrakParser::new()
            .to_html(md, &ParserConfig::default())
            .unwrap()
    }

    #[test]
    fn test_basic_render() {
        let html = render("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let span = r##"<span id="fnref-1-1" class="footnote-ref"><a href="#fn-1">[1]</a></span>"##;
        let html = render(&format!("Text{}.", span));
        assert!(html.contains(span));
    }

    #[test]
    fn test_gfm_table() {
        let html = render("| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>A</th>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_hard_breaks() {
        let html = render("one\ntwo");
        assert!(html.contains("<br"));

        let soft = ComrakParser::new()
            .to_html("one\ntwo", &ParserConfig::default().with_hard_breaks(false))
            .unwrap();
        assert!(!soft.contains("<br"));
    }

    #[test]
    fn test_heading_emphasis_removed() {
        let html = render("## **Market Overview**");
        assert!(html.contains("<h2>Market Overview</h2>"));
    }

    #[test]
    fn test_url_link_collapsed() {
        let parser = ComrakParser::new();
        let prepared = parser.prepare(
            "See [https://example.com](https://example.com) and [docs](https://example.com).",
            &ParserConfig::default(),
        );
        assert_eq!(
            prepared,
            "See <https://example.com> and [docs](https://example.com)."
        );
    }

    #[test]
    fn test_smart_lists() {
        let html = render("Intro\n\n• First\n• Second\n");
        assert!(html.contains("<li>First</li>"));
        assert!(html.contains("<li>Second</li>"));
    }

    #[test]
    fn test_code_fence_untouched() {
        let parser = ComrakParser::new();
        let md = "```\n# **keep**\n• keep\n```\n";
        assert_eq!(parser.prepare(md, &ParserConfig::default()), md);
    }

    #[test]
    fn test_straight_quotes_kept() {
        let html = render("\"quoted\" text");
        assert!(html.contains("&quot;quoted&quot;") || html.contains("\"quoted\""));
        assert!(!html.contains('\u{201C}'));
    }
}
