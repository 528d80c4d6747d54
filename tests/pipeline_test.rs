//! End-to-end tests for the conversion pipeline.

use std::sync::Arc;

use mdreport::parser::parse_html;
use mdreport::{
    convert, convert_many, convert_with_options, preprocess, ConvertOptions, Converter, Dom,
    Error, HtmlSanitizer, JsonFormat, MarkdownParser, MdReport, ParserConfig, Result,
    SanitizePolicy,
};

/// Parser that always fails.
struct BrokenParser;

impl MarkdownParser for BrokenParser {
    fn name(&self) -> &str {
        "broken"
    }

    fn to_html(&self, _markdown: &str, _config: &ParserConfig) -> Result<String> {
        Err(Error::Render("no backend".to_string()))
    }
}

/// Sanitizer that passes HTML through unchanged.
struct PassThrough;

impl HtmlSanitizer for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn sanitize(&self, html: &str, _policy: &SanitizePolicy) -> Result<String> {
        Ok(html.to_string())
    }
}

fn dom_of(html: &str) -> Dom {
    parse_html(html)
}

#[test]
fn test_footnote_round_trip() {
    let report = convert("Text[^1].\n\n[^1]: Note.").unwrap();
    let dom = dom_of(&report.html);

    let item = dom.get_element_by_id("fn-1").expect("bibliography entry");
    let content = dom.find_by_class(item, "footnote-content");
    assert_eq!(content.len(), 1);
    assert_eq!(dom.text_content(content[0]), "Note.");

    let backref = dom.find_by_class(item, "footnote-backref");
    assert_eq!(backref.len(), 1);
    let target = dom.attr(backref[0], "href").unwrap().trim_start_matches('#');
    assert!(dom.get_element_by_id(target).is_some());

    assert_eq!(report.html.matches("id=\"fn-1\"").count(), 1);
    assert_eq!(report.stats.broken_footnote_links, 0);
}

#[test]
fn test_consumer_report_table() {
    let markdown = "\
| Factor | Percentage of Consumers | Notes |
|---|---|---|
| Price | 64% | Compared across stores |
| Quality | 52% | Stable |
";
    let report = convert(markdown).unwrap();
    let dom = dom_of(&report.html);
    let root = dom.root();

    let table = dom.find_first(root, "table").unwrap();
    assert!(dom.has_class(table, "consumer-report-table"));
    assert!(dom.has_class(table, "normalized-table"));

    let body = dom.find_first(table, "tbody").unwrap();
    for row in dom.find_all(body, "tr") {
        let cells = dom.find_all(row, "td");
        assert_eq!(dom.style(cells[1], "text-align").as_deref(), Some("center"));
    }
    assert_eq!(report.stats.tables_processed, 1);
}

#[test]
fn test_escape_repair() {
    let report = convert("1\\. First item").unwrap();
    assert_eq!(report.markdown.trim_end(), "1. First item");
    assert!(report.html.contains("<ol>"));
}

#[test]
fn test_title_extraction() {
    let report = convert("# My Report\n\nBody text").unwrap();
    assert_eq!(report.title, "My Report");
    assert!(!report.markdown.contains("My Report"));
    assert!(!report.html.contains("<h1>"));
    assert!(report.html.contains("Body text"));
    assert_eq!(report.metadata.title, "My Report");
}

#[test]
fn test_script_and_handlers_removed() {
    let markdown = "Hello <span onclick=\"steal()\">there</span>\n\n<script>alert(1)</script>\n";
    let report = convert(markdown).unwrap();
    assert!(!report.html.contains("<script"));
    assert!(!report.html.contains("alert(1)"));
    assert!(!report.html.contains("onclick"));
    assert!(report.html.contains("there"));
}

#[test]
fn test_javascript_links_removed() {
    let report = convert("[click](javascript:alert(1))").unwrap();
    assert!(!report.html.contains("javascript:"));
}

#[test]
fn test_table_styles_survive_sanitizer() {
    let markdown = "| Name | Value |\n|---|---|\n| a | 1 |\n";
    let report = convert(markdown).unwrap();
    let dom = dom_of(&report.html);
    let table = dom.find_first(dom.root(), "table").unwrap();
    assert_eq!(dom.style(table, "font-size").as_deref(), Some("1em"));
    assert_eq!(dom.attr(table, "data-normalized-font-size"), Some("1"));
    assert_eq!(report.stats.document_font_scale, 1.0);
}

#[test]
fn test_broken_parser_fails() {
    let converter = Converter::default().with_parser(Arc::new(BrokenParser));
    match converter.convert("anything") {
        Err(Error::Render(message)) => assert_eq!(message, "no backend"),
        other => panic!("expected render error, got {:?}", other.map(|r| r.title)),
    }
}

#[test]
fn test_error_display() {
    let err = Error::Render("no backend".to_string());
    assert_eq!(err.to_string(), "rendering failed: no backend");
}

#[test]
fn test_custom_sanitizer() {
    let report = MdReport::new()
        .with_sanitizer(Arc::new(PassThrough))
        .convert("plain")
        .unwrap();
    assert!(report.html.contains("<p>plain</p>"));
}

#[test]
fn test_convert_many_keeps_order() {
    let docs: Vec<String> = (0..16).map(|i| format!("# Doc {}\n\nBody {}", i, i)).collect();
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    let reports = convert_many(&refs, &ConvertOptions::default());
    assert_eq!(reports.len(), 16);
    for (i, report) in reports.into_iter().enumerate() {
        assert_eq!(report.unwrap().title, format!("Doc {}", i));
    }
}

#[test]
fn test_convert_many_isolates_failures() {
    let converter = Converter::default().with_parser(Arc::new(BrokenParser));
    let results = converter.convert_many(&["a", "b"]);
    assert!(results.iter().all(|r| r.is_err()));
}

#[test]
fn test_code_block_untouched() {
    let markdown = "Intro\n\n```\n1\\. keep[^1]\n```\n";
    let report = convert(markdown).unwrap();
    assert!(report.markdown.contains("1\\. keep[^1]"));
    assert_eq!(report.stats.footnote_references, 0);
}

#[test]
fn test_options_disable_footnotes() {
    let options = ConvertOptions::default().with_footnotes(false);
    let report = convert_with_options("Text[^1].\n\n[^1]: Note.", &options).unwrap();
    assert!(!report.html.contains("footnote-ref"));
    assert_eq!(report.stats.footnote_references, 0);
}

#[test]
fn test_preprocess_matches_report_markdown() {
    let markdown = "# T\n\n\u{201C}Quote\u{201D}[^a]\n\n[^a]: Source\n";
    let options = ConvertOptions::default();
    let report = convert_with_options(markdown, &options).unwrap();
    assert_eq!(preprocess(markdown, &options), report.markdown);
}

#[test]
fn test_report_json() {
    let report = convert("# JSON\n\nBody").unwrap();
    let json = report.to_json(JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "JSON");
    assert!(value["stats"]["word_count"].is_number());
}

#[test]
fn test_standalone_html() {
    let report = convert("# Page\n\nBody").unwrap();
    let page = report.standalone_html();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Page</title>"));
    assert!(page.contains(".normalized-table"));
    assert!(page.contains(&report.html));
}
