//! Table classification and cell value detection.

use crate::model::{ColumnType, TableKind, TableModel};
use crate::render::Heuristics;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_FOOTNOTE_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\^?\d+\]|\^\d+|\[\d+\]|\(\d+\)").unwrap());

static RE_NUMERIC: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"^-?\s*\d+(\.\d+)?%?$").unwrap(),
        Regex::new(r"^\$\s*\d+(\.\d+)?$").unwrap(),
        Regex::new(r"^-?\s*\d{1,3}(,\d{3})+(\.\d+)?%?$").unwrap(),
        Regex::new(r"^-?\s*\d+(\.\d+)?[kKmMbBtT]$").unwrap(),
    ]
});

static RE_PURE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

static RE_PLUS_PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d+(\.\d+)?%").unwrap());

static RE_CITATION_PATTERNS: Lazy<[Regex; 5]> = Lazy::new(|| {
    [
        Regex::new(r"\[\^?\d+\]").unwrap(),
        Regex::new(r"\(\d{4}\)").unwrap(),
        Regex::new(r"\b[A-Z][a-z]+ et al\b").unwrap(),
        Regex::new(r"\bIbid\b").unwrap(),
        Regex::new(r"\b[A-Z][a-z]+ \d{4}\b").unwrap(),
    ]
});

/// Remove the first footnote marker from a cell value.
pub fn strip_footnote_marker(text: &str) -> String {
    RE_FOOTNOTE_MARK.replacen(text, 1, "").trim().to_string()
}

/// Whether a cell holds a number, amount, count or percentage.
pub fn is_numeric(text: &str) -> bool {
    let stripped = strip_footnote_marker(text);
    !stripped.is_empty() && RE_NUMERIC.iter().any(|re| re.is_match(&stripped))
}

/// Whether the value carries a footnote marker around a number.
pub fn is_numeric_with_footnote(text: &str) -> bool {
    let stripped = strip_footnote_marker(text);
    stripped != text.trim() && is_numeric(&stripped)
}

/// Whether a value is a signed increase such as `+22%`.
pub fn is_plus_percentage(text: &str) -> bool {
    RE_PLUS_PERCENTAGE.is_match(text.trim())
}

/// Column type of a single value.
pub fn column_type(text: &str) -> ColumnType {
    if is_plus_percentage(text) {
        ColumnType::PlusPercentage
    } else if text.contains('%') {
        ColumnType::Percentage
    } else if RE_PURE_NUMBER.is_match(&strip_footnote_marker(text)) {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

/// Decide the table kind. The first matching rule wins.
pub fn classify(model: &TableModel, heuristics: &Heuristics) -> TableKind {
    let headers = model.header_texts();
    if is_demographic(model, &headers, heuristics) {
        TableKind::Demographic
    } else if is_consumer_report(model, &headers) {
        TableKind::ConsumerReport
    } else if is_financial(model, &headers, heuristics) {
        TableKind::Financial
    } else if is_reference(model, &headers) {
        TableKind::Reference
    } else {
        TableKind::General
    }
}

fn is_demographic(model: &TableModel, headers: &[String], heuristics: &Heuristics) -> bool {
    let header_match = headers.iter().any(|header| {
        header
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| heuristics.demographic_header_words.iter().any(|w| w == word))
    });
    if header_match {
        return true;
    }

    if model.row_count() <= 2 {
        return false;
    }
    let Some(first) = model.rows.first() else {
        return false;
    };
    let has_number = first
        .iter()
        .any(|c| RE_PURE_NUMBER.is_match(&strip_footnote_marker(&c.text)));
    let has_percentage = first
        .iter()
        .any(|c| c.text.contains('%') || is_plus_percentage(&c.text));
    has_number && has_percentage
}

fn is_consumer_report(model: &TableModel, headers: &[String]) -> bool {
    if headers.len() != 3 {
        return false;
    }
    let first = &headers[0];
    let second = &headers[1];
    let factor = ["factor", "item", "motivat"].iter().any(|k| first.contains(k));
    let percentage = ["percentage", "percent", "consumers", "respondents", "%"]
        .iter()
        .any(|k| second.contains(k));
    if !(factor && percentage) {
        return false;
    }

    let data_rows = model.rows.len();
    let with_percent = model
        .column(1)
        .iter()
        .filter(|c| c.text.contains('%'))
        .count();
    with_percent > 0 && 2 * with_percent >= data_rows
}

fn is_financial(model: &TableModel, headers: &[String], heuristics: &Heuristics) -> bool {
    let metric = headers.iter().any(|h| h == "metric" || h.contains("item"));
    let value = headers.iter().any(|h| h == "value" || h.contains("amount"));
    let notes = headers.iter().any(|h| h == "notes" || h.contains("description"));
    if metric && (value || notes) {
        return true;
    }
    if headers
        .iter()
        .any(|h| heuristics.financial_header_names.iter().any(|n| n == h))
    {
        return true;
    }
    model.preceding_heading.as_ref().is_some_and(|heading| {
        let heading = heading.to_lowercase();
        heuristics
            .financial_heading_words
            .iter()
            .any(|w| heading.contains(w.as_str()))
    })
}

fn is_reference(model: &TableModel, headers: &[String]) -> bool {
    if headers
        .last()
        .is_some_and(|h| h.contains("source") || h.contains("reference"))
    {
        return true;
    }
    if model.data_cells().any(|c| c.has_link || c.has_sup) {
        return true;
    }
    let text: Vec<&str> = model.all_cells().map(|c| c.text.as_str()).collect();
    let text = text.join(" ");
    RE_CITATION_PATTERNS
        .iter()
        .any(|re| re.is_match(&text) || re.is_match(&model.markup))
}

/// Index of the column holding sources in a reference table.
pub fn source_column(model: &TableModel) -> Option<usize> {
    model
        .header_texts()
        .iter()
        .rposition(|h| h.contains("source") || h.contains("reference"))
}
