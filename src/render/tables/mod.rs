//! Table classification and formatting.
//!
//! Every table is planned first, without touching the DOM. The smallest
//! recommended font scale across all plans becomes the document scale, and
//! only then are the plans written back. A table that cannot be planned is
//! skipped and left as it was.

mod classify;
mod layout;
mod profile;

pub use classify::{classify, column_type, is_numeric, strip_footnote_marker};
pub use layout::TableLayout;
pub use profile::{
    document_font_scale, profile_columns, table_font_scale, widths_from_scores,
    DEFAULT_DOCUMENT_SCALE, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH, MIN_DOCUMENT_SCALE,
    MIN_FONT_SCALE,
};

use crate::error::TableError;
use crate::model::{Dom, NodeId, TableModel};
use crate::parser::panic_message;
use crate::render::Heuristics;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Outcome of formatting every table in a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSummary {
    /// Tables that were formatted
    pub processed: usize,

    /// Tables left untouched because they could not be planned
    pub skipped: usize,

    /// Font scale applied to every table
    pub font_scale: f64,
}

impl Default for TableSummary {
    fn default() -> Self {
        Self {
            processed: 0,
            skipped: 0,
            font_scale: DEFAULT_DOCUMENT_SCALE,
        }
    }
}

/// Snapshot and plan one table.
pub fn plan_table(
    dom: &Dom,
    table: NodeId,
    heuristics: &Heuristics,
) -> Result<(TableModel, TableLayout), TableError> {
    catch_unwind(AssertUnwindSafe(|| -> Result<_, TableError> {
        let model = TableModel::from_dom(dom, table)?;
        let layout = TableLayout::plan(&model, heuristics);
        Ok((model, layout))
    }))
    .unwrap_or_else(|payload| Err(TableError::Inconsistent(panic_message(payload.as_ref()))))
}

/// Classify and format every table in the DOM.
pub fn format_tables(dom: &mut Dom, heuristics: &Heuristics) -> TableSummary {
    let tables = dom.find_all(dom.root(), "table");
    if tables.is_empty() {
        return TableSummary::default();
    }

    let mut plans = Vec::with_capacity(tables.len());
    let mut skipped = 0;
    for table in tables {
        match plan_table(dom, table, heuristics) {
            Ok(plan) => plans.push(plan),
            Err(err) => {
                log::warn!("Skipping table: {}", err);
                skipped += 1;
            }
        }
    }

    let scales: Vec<f64> = plans.iter().map(|(_, layout)| layout.font_scale).collect();
    let font_scale = document_font_scale(&scales);
    for (model, layout) in &plans {
        log::debug!(
            "Formatting {:?} table with {} columns and {} rows",
            layout.kind,
            model.column_count(),
            model.row_count()
        );
        layout.apply(dom, model, font_scale);
    }

    TableSummary {
        processed: plans.len(),
        skipped,
        font_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_no_tables() {
        let mut dom = parse_html("<p>text</p>");
        let summary = format_tables(&mut dom, &Heuristics::default());
        assert_eq!(summary, TableSummary::default());
        assert_eq!(dom.to_html(), "<p>text</p>");
    }

    #[test]
    fn test_empty_table_skipped() {
        let mut dom = parse_html(
            "<table></table><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>",
        );
        let summary = format_tables(&mut dom, &Heuristics::default());
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(dom.to_html().starts_with("<table></table>"));
    }

    #[test]
    fn test_document_scale_shared() {
        let wide: String = (0..11).map(|i| format!("<th>c{}</th>", i)).collect();
        let wide_row: String = (0..11).map(|i| format!("<td>{}</td>", i)).collect();
        let html = format!(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>x</td><td>y</td></tr></table>\
             <table><tr>{}</tr><tr>{}</tr></table>",
            wide, wide_row
        );
        let mut dom = parse_html(&html);
        let summary = format_tables(&mut dom, &Heuristics::default());
        assert_eq!(summary.font_scale, MIN_DOCUMENT_SCALE);

        let first = dom.find_first(dom.root(), "table").unwrap();
        assert_eq!(dom.style(first, "font-size").as_deref(), Some("0.8em"));
    }
}
