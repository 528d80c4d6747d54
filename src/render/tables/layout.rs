//! Per-table layout: computed from a snapshot, then written to the DOM.

use super::classify::{
    classify, column_type, is_numeric, is_numeric_with_footnote, is_plus_percentage,
    source_column,
};
use super::profile::{
    cell_padding, column_widths, css_number, id_column, profile_columns, row_height,
    table_font_scale,
};
use crate::model::{
    Alignment, CellRef, ColumnProfile, ColumnType, Dom, NodeId, TableKind, TableModel,
};
use crate::render::Heuristics;
use serde::Serialize;

const LONG_COLUMN: f64 = 50.0;
const LONG_FINANCIAL_COLUMN: f64 = 30.0;
const LONG_CELL: usize = 100;
const TOOLTIP_CELL: usize = 150;
const ZEBRA_BACKGROUND: &str = "#f8f8f8";
const ID_COLUMN_WIDTH: &str = "4em";
const SCROLL_NOTE: &str = "Scroll horizontally to view all columns";

/// Everything decided about one table before the DOM is touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLayout {
    pub kind: TableKind,

    /// Data cell alignment per column
    pub alignments: Vec<Alignment>,

    /// Column types sampled from the first data row
    pub column_types: Vec<ColumnType>,

    /// Statistics over the data rows
    pub profiles: Vec<ColumnProfile>,

    /// Column widths in percent, empty for single-column tables
    pub widths: Vec<f64>,

    /// Recommended font scale for this table alone
    pub font_scale: f64,

    pub id_column: Option<usize>,

    /// Source column of a reference table
    pub source_column: Option<usize>,

    /// `min-height` of data rows
    pub row_height: Option<String>,
}

impl TableLayout {
    /// Analyse a table snapshot.
    pub fn plan(model: &TableModel, heuristics: &Heuristics) -> Self {
        let kind = classify(model, heuristics);
        let columns = model.column_count();
        let profiles = profile_columns(model);
        let column_types: Vec<ColumnType> = (0..columns)
            .map(|i| model.cell(0, i).map_or(ColumnType::Text, |c| column_type(&c.text)))
            .collect();

        let alignments = match kind {
            TableKind::Demographic => column_types
                .iter()
                .map(|t| match t {
                    ColumnType::Numeric => Alignment::Right,
                    ColumnType::Percentage | ColumnType::PlusPercentage => Alignment::Center,
                    ColumnType::Text => Alignment::Left,
                })
                .collect(),
            TableKind::ConsumerReport => {
                let mut alignments = general_alignments(&profiles, LONG_COLUMN, false);
                if let Some(second) = alignments.get_mut(1) {
                    *second = Alignment::Center;
                }
                alignments
            }
            TableKind::Financial => general_alignments(&profiles, LONG_FINANCIAL_COLUMN, true),
            TableKind::Reference | TableKind::General => {
                general_alignments(&profiles, LONG_COLUMN, false)
            }
        };

        let widths = column_widths(model);
        let font_scale = table_font_scale(model);
        let row_height = row_height(model, &widths, font_scale, heuristics.page_width_px);

        Self {
            kind,
            alignments,
            column_types,
            profiles,
            widths,
            font_scale,
            id_column: id_column(model),
            source_column: (kind == TableKind::Reference)
                .then(|| source_column(model))
                .flatten(),
            row_height,
        }
    }

    /// Write the layout to the table with the document-wide font scale.
    pub fn apply(&self, dom: &mut Dom, model: &TableModel, document_scale: f64) {
        let columns = model.column_count();
        let table = model.table;

        dom.add_class(table, "normalized-table");
        for class in self.kind.classes() {
            dom.add_class(table, class);
        }
        if columns > 4 {
            dom.add_class(table, "data-table");
        }
        dom.set_style(table, "font-size", format!("{}em", css_number(document_scale)));
        dom.set_attr(table, "data-normalized-font-size", css_number(document_scale));
        if columns > 5 {
            wrap_responsive(dom, table);
        }

        let padding = format!("{}px", css_number(cell_padding(document_scale)));
        for (column, cell) in model.header.iter().enumerate() {
            dom.set_style(cell.node, "text-align", Alignment::Center.as_css());
            if let Some(width) = self.widths.get(column) {
                dom.set_style(cell.node, "width", format!("{}%", css_number(*width)));
            }
            if self.id_column == Some(column) {
                dom.set_style(cell.node, "width", ID_COLUMN_WIDTH);
                dom.add_class(cell.node, "id-column-header");
            }
            self.apply_cell_common(dom, cell, columns, &padding);
        }

        for (index, (&row, cells)) in model.row_nodes.iter().zip(&model.rows).enumerate() {
            if index % 2 == 1 {
                dom.set_style(row, "background-color", ZEBRA_BACKGROUND);
            }
            if let Some(height) = &self.row_height {
                dom.set_style(row, "min-height", height.as_str());
            }
            for (column, cell) in cells.iter().enumerate() {
                self.apply_data_cell(dom, cell, column, columns);
                self.apply_cell_common(dom, cell, columns, &padding);
                if let Some(height) = &self.row_height {
                    dom.set_style(cell.node, "min-height", height.as_str());
                }
            }
        }
    }

    fn apply_cell_common(&self, dom: &mut Dom, cell: &CellRef, columns: usize, padding: &str) {
        if columns > 6 {
            dom.set_style(cell.node, "font-size", "0.8em");
            dom.set_style(cell.node, "padding", "4px 6px");
        }
        dom.set_style(cell.node, "padding", padding);

        let length = cell.len();
        if length > LONG_CELL {
            dom.add_class(cell.node, "long-content");
        }
        if length > TOOLTIP_CELL {
            dom.set_attr(cell.node, "title", cell.text.as_str());
        }
    }

    fn apply_data_cell(&self, dom: &mut Dom, cell: &CellRef, column: usize, columns: usize) {
        let node = cell.node;
        let alignment = self.alignments.get(column).copied().unwrap_or_default();
        dom.set_style(node, "text-align", alignment.as_css());

        if self.id_column == Some(column) {
            dom.set_style(node, "text-align", Alignment::Center.as_css());
            dom.set_style(node, "width", ID_COLUMN_WIDTH);
            dom.add_class(node, "id-column");
        }
        if self.kind == TableKind::Demographic {
            if let Some(column_type) = self.column_types.get(column) {
                dom.add_class(node, column_type.class());
            }
        }

        for class in cell_classes(cell) {
            dom.add_class(node, class);
        }
        if column == 0 {
            dom.add_class(node, "label-cell");
        }
        let financial_notes =
            self.kind == TableKind::Financial && columns >= 3 && column == columns - 1;
        if cell.len() > LONG_COLUMN as usize || financial_notes {
            dom.add_class(node, "notes-cell");
        }
        if self.source_column == Some(column) {
            dom.add_class(node, "source-cell");
        }
    }
}

fn general_alignments(
    profiles: &[ColumnProfile],
    long_threshold: f64,
    center_short_always: bool,
) -> Vec<Alignment> {
    let columns = profiles.len();
    profiles
        .iter()
        .enumerate()
        .map(|(column, profile)| {
            if column == 0 {
                Alignment::Left
            } else if profile.is_numeric_dominant {
                Alignment::Right
            } else if profile.average_text_length > long_threshold {
                Alignment::Left
            } else if profile.average_text_length < 10.0 && profile.max_text_length < 15 {
                if center_short_always || columns <= 3 {
                    Alignment::Center
                } else {
                    Alignment::Left
                }
            } else {
                Alignment::Left
            }
        })
        .collect()
}

/// Value classes of a data cell.
fn cell_classes(cell: &CellRef) -> Vec<&'static str> {
    let mut classes = Vec::new();
    if is_numeric(&cell.text) {
        classes.push("numeric-cell");
    }
    if is_plus_percentage(&cell.text) {
        classes.push("plus-percentage-value");
    } else if cell.text.contains('%') {
        classes.push("percentage-value");
    }
    if is_numeric_with_footnote(&cell.text) {
        classes.push("numeric-with-footnote");
    }
    if cell.has_link || cell.has_sup {
        classes.push("has-reference");
    }
    classes
}

fn wrap_responsive(dom: &mut Dom, table: NodeId) {
    if dom
        .parent(table)
        .is_some_and(|p| dom.has_class(p, "table-responsive"))
    {
        return;
    }
    let wrapper = dom.create_element("div");
    dom.add_class(wrapper, "table-responsive");
    let note = dom.create_element("div");
    dom.add_class(note, "table-note");
    dom.set_text_content(note, SCROLL_NOTE);

    dom.insert_before(table, wrapper);
    dom.append(wrapper, note);
    dom.append(wrapper, table);
}
