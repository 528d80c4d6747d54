//! Table snapshot types.
//!
//! A [`TableModel`] is a read-only view of one `<table>` in a [`Dom`]. It keeps
//! the node ids of every cell so that a layout computed from the snapshot can
//! be written back to the tree afterwards.

use super::dom::{Dom, NodeId};
use crate::error::TableError;
use serde::Serialize;

/// Horizontal alignment of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left aligned
    #[default]
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
}

impl Alignment {
    /// CSS `text-align` value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Table category decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    /// Age groups, demographics, or mixed numeric and percentage columns
    Demographic,
    /// Factor / percentage-of-consumers / notes survey tables
    ConsumerReport,
    /// Metric / value / notes tables and tables under a finance heading
    Financial,
    /// Tables carrying citations or sources
    Reference,
    /// Everything else
    General,
}

impl TableKind {
    /// Classes added to the `<table>` element for this kind.
    pub fn classes(&self) -> &'static [&'static str] {
        match self {
            TableKind::Demographic => &["demographic-table", "mixed-data-table"],
            TableKind::ConsumerReport => &["consumer-report-table"],
            TableKind::Financial => &["financial-table", "metrics-table"],
            TableKind::Reference => &["reference-table"],
            TableKind::General => &[],
        }
    }
}

/// Content type of a column, sampled from the first data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    /// Plain numbers such as `8.3`
    Numeric,
    /// Values containing `%`
    Percentage,
    /// Values such as `+22%`
    PlusPercentage,
    /// Anything else
    Text,
}

impl ColumnType {
    /// Class added to cells of this column type.
    pub fn class(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric-column",
            ColumnType::Percentage => "percentage-column",
            ColumnType::PlusPercentage => "plus-percentage-column",
            ColumnType::Text => "text-column",
        }
    }
}

/// Aggregate statistics of one column over the data rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnProfile {
    /// Mean trimmed text length in chars
    pub average_text_length: f64,

    /// Longest trimmed text length
    pub max_text_length: usize,

    /// Shortest trimmed text length
    pub min_text_length: usize,

    /// Every non-empty cell is numeric
    pub is_numeric_dominant: bool,
}

/// One cell of the snapshot.
#[derive(Debug, Clone)]
pub struct CellRef {
    /// The `<td>` or `<th>` node
    pub node: NodeId,

    /// Trimmed text content
    pub text: String,

    /// The cell contains an `<a>`
    pub has_link: bool,

    /// The cell contains a `<sup>`
    pub has_sup: bool,

    /// The cell contains a `<ul>` or `<ol>`
    pub has_list: bool,
}

impl CellRef {
    fn capture(dom: &Dom, node: NodeId) -> Self {
        Self {
            node,
            text: dom.text_content(node).trim().to_string(),
            has_link: dom.has_descendant_tag(node, "a"),
            has_sup: dom.has_descendant_tag(node, "sup"),
            has_list: dom.has_descendant_tag(node, "ul") || dom.has_descendant_tag(node, "ol"),
        }
    }

    /// Length of the trimmed text in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the cell has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Read-only snapshot of a table.
#[derive(Debug, Clone)]
pub struct TableModel {
    /// The `<table>` node
    pub table: NodeId,

    /// The first `<tr>`
    pub header_row: NodeId,

    /// Cells of the first row
    pub header: Vec<CellRef>,

    /// Remaining `<tr>` nodes
    pub row_nodes: Vec<NodeId>,

    /// Cells of the remaining rows
    pub rows: Vec<Vec<CellRef>>,

    /// Text of the nearest heading before the table, if any
    pub preceding_heading: Option<String>,

    /// Serialized inner markup, used for citation pattern checks
    pub markup: String,
}

impl TableModel {
    /// Snapshot a `<table>` element.
    pub fn from_dom(dom: &Dom, table: NodeId) -> Result<Self, TableError> {
        if !dom.is_tag(table, "table") {
            return Err(TableError::Inconsistent(format!(
                "expected <table>, found {:?}",
                dom.tag(table)
            )));
        }

        let tr_nodes: Vec<NodeId> = dom
            .find_all(table, "tr")
            .into_iter()
            .filter(|&tr| owning_table(dom, tr) == Some(table))
            .collect();
        let (&header_row, row_nodes) = tr_nodes.split_first().ok_or(TableError::NoRows)?;

        let header = row_cells(dom, header_row);
        if header.is_empty() {
            return Err(TableError::NoColumns);
        }
        let rows = row_nodes.iter().map(|&tr| row_cells(dom, tr)).collect();

        Ok(Self {
            table,
            header_row,
            header,
            row_nodes: row_nodes.to_vec(),
            rows,
            preceding_heading: preceding_heading(dom, table),
            markup: dom.inner_html(table),
        })
    }

    /// Number of columns, taken from the header row.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Lower-cased header texts.
    pub fn header_texts(&self) -> Vec<String> {
        self.header.iter().map(|c| c.text.to_lowercase()).collect()
    }

    /// Data cell at (row, column), if present.
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellRef> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Data cells of one column, skipping rows that are too short.
    pub fn column(&self, column: usize) -> Vec<&CellRef> {
        self.rows.iter().filter_map(|r| r.get(column)).collect()
    }

    /// Header and data cells of one column.
    pub fn column_with_header(&self, column: usize) -> Vec<&CellRef> {
        self.header
            .get(column)
            .into_iter()
            .chain(self.column(column))
            .collect()
    }

    /// Every cell, header first.
    pub fn all_cells(&self) -> impl Iterator<Item = &CellRef> {
        self.header.iter().chain(self.rows.iter().flatten())
    }

    /// Every data cell.
    pub fn data_cells(&self) -> impl Iterator<Item = &CellRef> {
        self.rows.iter().flatten()
    }
}

fn row_cells(dom: &Dom, tr: NodeId) -> Vec<CellRef> {
    dom.element_children(tr)
        .into_iter()
        .filter(|&c| dom.is_tag(c, "td") || dom.is_tag(c, "th"))
        .map(|c| CellRef::capture(dom, c))
        .collect()
}

fn owning_table(dom: &Dom, node: NodeId) -> Option<NodeId> {
    let mut current = dom.parent(node);
    while let Some(id) = current {
        if dom.is_tag(id, "table") {
            return Some(id);
        }
        current = dom.parent(id);
    }
    None
}

/// Text of the nearest heading among the previous siblings of the table, or
/// of its wrapper when the table is already wrapped.
fn preceding_heading(dom: &Dom, table: NodeId) -> Option<String> {
    let anchor = match dom.parent(table) {
        Some(parent) if dom.has_class(parent, "table-responsive") => parent,
        _ => table,
    };
    let mut sibling = dom.previous_element_sibling(anchor);
    while let Some(id) = sibling {
        if dom.is_heading(id) {
            return Some(dom.text_content(id));
        }
        sibling = dom.previous_element_sibling(id);
    }
    None
}
