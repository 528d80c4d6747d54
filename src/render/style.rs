//! Style directives returned alongside the HTML.
//!
//! The converter never injects a `<style>` element into the fragment. It hands
//! back a [`StyleSheet`] for the classes it used and lets the caller decide
//! where the rules go.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One CSS rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Selector list
    pub selector: String,

    /// `(property, value)` pairs in order
    pub declarations: Vec<(String, String)>,
}

impl StyleRule {
    /// Create a rule from borrowed declarations.
    pub fn new(selector: impl Into<String>, declarations: &[(&str, &str)]) -> Self {
        Self {
            selector: selector.into(),
            declarations: declarations
                .iter()
                .map(|(p, v)| (p.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Value of a property, if declared.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }
}

/// An ordered list of style rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    /// Rules in cascade order
    pub rules: Vec<StyleRule>,
}

impl StyleSheet {
    /// Create an empty style sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules for a converted report with the given table font scale.
    pub fn report(font_scale: f64) -> Self {
        let mut sheet = Self::new();
        sheet.push_table_rules();
        sheet.push_footnote_rules();
        sheet.push(StyleRule {
            selector: ":root".to_string(),
            declarations: vec![(
                "--table-font-scale".to_string(),
                format!("{:.2}", font_scale),
            )],
        });
        sheet
    }

    /// Append a rule.
    pub fn push(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    /// First rule with exactly this selector.
    pub fn rule(&self, selector: &str) -> Option<&StyleRule> {
        self.rules.iter().find(|r| r.selector == selector)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the sheet has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render as CSS text, one rule per line.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for rule in &self.rules {
            let body = rule
                .declarations
                .iter()
                .map(|(p, v)| format!("{}: {};", p, v))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(css, "{} {{ {} }}", rule.selector, body);
        }
        css
    }

    fn push_table_rules(&mut self) {
        self.push(StyleRule::new(
            ".normalized-table",
            &[
                ("width", "100%"),
                ("border-collapse", "collapse"),
                ("border-spacing", "0"),
                ("margin", "1.5em 0"),
            ],
        ));
        self.push(StyleRule::new(
            ".normalized-table th, .normalized-table td",
            &[
                ("border", "1px solid #dddddd"),
                ("vertical-align", "middle"),
                ("white-space", "normal"),
                ("word-wrap", "break-word"),
            ],
        ));
        self.push(StyleRule::new(
            ".normalized-table th",
            &[
                ("background-color", "#f2f7fd"),
                ("color", "#333333"),
                ("font-weight", "600"),
            ],
        ));
        self.push(StyleRule::new(
            ".table-responsive",
            &[("overflow-x", "auto"), ("margin", "1.5em 0")],
        ));
        self.push(StyleRule::new(
            ".table-note",
            &[
                ("font-size", "0.8em"),
                ("font-style", "italic"),
                ("color", "#666666"),
                ("margin-bottom", "0.25em"),
            ],
        ));
        self.push(StyleRule::new(
            ".id-column, .id-column-header",
            &[("width", "4em"), ("max-width", "4em"), ("text-align", "center")],
        ));
        self.push(StyleRule::new(
            ".long-content",
            &[("font-size", "0.95em"), ("line-height", "1.4")],
        ));
    }

    fn push_footnote_rules(&mut self) {
        self.push(StyleRule::new(
            ".footnote-ref",
            &[("vertical-align", "super"), ("font-size", "0.75em")],
        ));
        self.push(StyleRule::new(
            ".footnote-ref a, .footnote-backref",
            &[("text-decoration", "none")],
        ));
        self.push(StyleRule::new(
            ".works-cited",
            &[("margin-top", "2em"), ("font-size", "0.9em")],
        ));
        self.push(StyleRule::new(
            ".footnote-list",
            &[("list-style", "none"), ("padding-left", "0")],
        ));
        self.push(StyleRule::new(
            ".url-only-link",
            &[("word-break", "break-all")],
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_sheet() {
        let sheet = StyleSheet::report(0.8);
        assert!(sheet.rule(".normalized-table").is_some());
        assert!(sheet.rule(".works-cited").is_some());
        assert_eq!(
            sheet.rule(":root").and_then(|r| r.get("--table-font-scale")),
            Some("0.80")
        );
    }

    #[test]
    fn test_to_css() {
        let mut sheet = StyleSheet::new();
        sheet.push(StyleRule::new(".a", &[("color", "red"), ("margin", "0")]));
        assert_eq!(sheet.to_css(), ".a { color: red; margin: 0; }\n");
    }

    #[test]
    fn test_default_is_empty() {
        assert!(StyleSheet::default().is_empty());
        assert_eq!(StyleSheet::default().to_css(), "");
    }
}
