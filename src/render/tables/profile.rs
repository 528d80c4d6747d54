//! Column statistics and the size computations derived from them.

use super::classify::is_numeric;
use crate::model::{CellRef, ColumnProfile, TableModel};
use once_cell::sync::Lazy;
use regex::Regex;

/// Narrowest column width in percent.
pub const MIN_COLUMN_WIDTH: f64 = 5.0;

/// Widest column width in percent.
pub const MAX_COLUMN_WIDTH: f64 = 60.0;

/// Smallest per-table font scale.
pub const MIN_FONT_SCALE: f64 = 0.7;

/// Smallest document font scale.
pub const MIN_DOCUMENT_SCALE: f64 = 0.8;

/// Document font scale when there are no tables.
pub const DEFAULT_DOCUMENT_SCALE: f64 = 0.95;

const PX_PER_CHAR: f64 = 16.0;
const CHAR_WIDTH_FACTOR: f64 = 0.6;
const LINE_HEIGHT_EM: f64 = 1.4;
const SINGLE_LINE_HEIGHT: &str = "1.9em";

static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Statistics of one column over the data rows.
pub fn profile_column(cells: &[&CellRef]) -> ColumnProfile {
    if cells.is_empty() {
        return ColumnProfile {
            average_text_length: 0.0,
            max_text_length: 0,
            min_text_length: 0,
            is_numeric_dominant: false,
        };
    }
    let lengths: Vec<usize> = cells.iter().map(|c| c.len()).collect();
    let total: usize = lengths.iter().sum();
    let non_empty: Vec<&&CellRef> = cells.iter().filter(|c| !c.is_empty()).collect();

    ColumnProfile {
        average_text_length: total as f64 / cells.len() as f64,
        max_text_length: lengths.iter().copied().max().unwrap_or(0),
        min_text_length: lengths.iter().copied().min().unwrap_or(0),
        is_numeric_dominant: !non_empty.is_empty() && non_empty.iter().all(|c| is_numeric(&c.text)),
    }
}

/// Profiles of every column, data rows only.
pub fn profile_columns(model: &TableModel) -> Vec<ColumnProfile> {
    (0..model.column_count())
        .map(|i| profile_column(&model.column(i)))
        .collect()
}

/// Column widths in percent, or empty for single-column tables.
///
/// Each column is scored `0.7 * avg + 0.3 * max` over header and data cells.
pub fn column_widths(model: &TableModel) -> Vec<f64> {
    let columns = model.column_count();
    if columns <= 1 {
        return Vec::new();
    }
    let scores: Vec<f64> = (0..columns)
        .map(|i| {
            let profile = profile_column(&model.column_with_header(i));
            0.7 * profile.average_text_length + 0.3 * profile.max_text_length as f64
        })
        .collect();
    widths_from_scores(&scores)
}

/// Turn column scores into percentages that sum to 100 and stay in
/// `[MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH]`.
pub fn widths_from_scores(scores: &[f64]) -> Vec<f64> {
    let n = scores.len();
    if n == 0 {
        return Vec::new();
    }
    let equal = 100.0 / n as f64;
    if equal < MIN_COLUMN_WIDTH || equal > MAX_COLUMN_WIDTH {
        log::debug!("{} columns cannot fit the width bounds, using equal widths", n);
        return vec![equal; n];
    }

    let max_score = scores.iter().copied().fold(0.0_f64, f64::max);
    let max_score = if max_score > 0.0 { max_score } else { 1.0 };
    let mut widths: Vec<f64> = scores
        .iter()
        .map(|s| (s.max(0.0) / max_score * 100.0 / n as f64).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH))
        .collect();

    // Scale the free columns until the total is 100, pinning any column that
    // crosses a bound.
    let mut pinned = vec![false; n];
    for _ in 0..=n {
        let fixed: f64 = widths.iter().zip(&pinned).filter(|(_, p)| **p).map(|(w, _)| w).sum();
        let free: f64 = widths.iter().zip(&pinned).filter(|(_, p)| !**p).map(|(w, _)| w).sum();
        let free_count = pinned.iter().filter(|p| !**p).count();
        if free_count == 0 {
            break;
        }
        let target = 100.0 - fixed;
        let factor = if free > 0.0 { target / free } else { 0.0 };

        let mut changed = false;
        for i in 0..n {
            if pinned[i] {
                continue;
            }
            let scaled = if free > 0.0 {
                widths[i] * factor
            } else {
                target / free_count as f64
            };
            if scaled > MAX_COLUMN_WIDTH {
                widths[i] = MAX_COLUMN_WIDTH;
                pinned[i] = true;
                changed = true;
            } else if scaled < MIN_COLUMN_WIDTH {
                widths[i] = MIN_COLUMN_WIDTH;
                pinned[i] = true;
                changed = true;
            } else {
                widths[i] = scaled;
            }
        }
        if !changed {
            break;
        }
    }

    // Pinning can overshoot when every column ends up pinned; spread the
    // remainder over columns that still have room.
    let mut remainder = 100.0 - widths.iter().sum::<f64>();
    for width in widths.iter_mut() {
        if remainder.abs() < 1e-9 {
            break;
        }
        let room = if remainder > 0.0 {
            MAX_COLUMN_WIDTH - *width
        } else {
            MIN_COLUMN_WIDTH - *width
        };
        let delta = if remainder > 0.0 {
            remainder.min(room)
        } else {
            remainder.max(room)
        };
        *width += delta;
        remainder -= delta;
    }
    widths
}

/// Recommended font scale for one table.
pub fn table_font_scale(model: &TableModel) -> f64 {
    let columns = model.column_count();
    let mut scale: f64 = if columns > 10 {
        0.7
    } else if columns > 7 {
        0.8
    } else if columns > 5 {
        0.9
    } else {
        1.0
    };

    let lengths: Vec<usize> = model.all_cells().map(CellRef::len).collect();
    if !lengths.is_empty() {
        let average = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        if average > 30.0 {
            scale -= 0.05;
        }
    }
    scale.max(MIN_FONT_SCALE)
}

/// Document-wide scale from the per-table recommendations.
pub fn document_font_scale(scales: &[f64]) -> f64 {
    match scales.iter().copied().reduce(f64::min) {
        Some(min) => min.max(MIN_DOCUMENT_SCALE),
        None => DEFAULT_DOCUMENT_SCALE,
    }
}

/// Cell padding in px for a font scale.
pub fn cell_padding(scale: f64) -> f64 {
    (7.0 * scale).max(4.0)
}

/// Index of the ID column, if any.
pub fn id_column(model: &TableModel) -> Option<usize> {
    let headers = model.header_texts();
    if let Some(index) = headers.iter().position(|h| h == "id" || h == "#") {
        return Some(index);
    }
    if model.rows.len() < 2 {
        return None;
    }

    (0..model.column_count().min(2)).find(|&column| {
        let cells = model.column(column);
        if cells.len() != model.rows.len() || !cells.iter().all(|c| RE_DIGITS.is_match(&c.text)) {
            return false;
        }
        column == 0 || is_sequential(&cells)
    })
}

fn is_sequential(cells: &[&CellRef]) -> bool {
    let values: Option<Vec<u64>> = cells.iter().map(|c| c.text.parse().ok()).collect();
    let Some(values) = values else {
        return false;
    };
    values.windows(2).all(|w| w[0].checked_add(1) == Some(w[1]))
}

/// `min-height` for data rows, or `None` when the table has a single data row.
pub fn row_height(model: &TableModel, widths: &[f64], scale: f64, page_width_px: f64) -> Option<String> {
    if model.rows.len() <= 1 {
        return None;
    }
    let columns = model.column_count().max(1);
    let cell_width = |column: usize| -> f64 {
        let percent = widths.get(column).copied().unwrap_or(100.0 / columns as f64);
        percent / 100.0 * page_width_px
    };

    let mut multi_line = false;
    let mut max_content = 0.0_f64;
    let mut min_cell = f64::INFINITY;
    for row in &model.rows {
        for (column, cell) in row.iter().enumerate() {
            let content = cell.len() as f64 * PX_PER_CHAR * scale * CHAR_WIDTH_FACTOR;
            let width = cell_width(column);
            if content > width {
                multi_line = true;
            }
            max_content = max_content.max(content);
            min_cell = min_cell.min(width);
        }
    }

    if multi_line && min_cell > 0.0 && min_cell.is_finite() {
        let lines = (max_content / min_cell).ceil().max(2.0);
        Some(format!("{}em", css_number(lines * LINE_HEIGHT_EM)))
    } else {
        Some(SINGLE_LINE_HEIGHT.to_string())
    }
}

/// Format a number for CSS with at most two decimals.
pub fn css_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn model(header: &[&str], rows: &[&[&str]]) -> TableModel {
        let head: String = header.iter().map(|h| format!("<th>{}</th>", h)).collect();
        let body: String = rows
            .iter()
            .map(|r| format!("<tr>{}</tr>", r.iter().map(|c| format!("<td>{}</td>", c)).collect::<String>()))
            .collect();
        let dom = parse_html(&format!("<table><tr>{}</tr>{}</table>", head, body));
        let table = dom.find_first(dom.root(), "table").unwrap();
        TableModel::from_dom(&dom, table).unwrap()
    }

    fn assert_width_bounds(widths: &[f64]) {
        let total: f64 = widths.iter().sum();
        assert!((total - 100.0).abs() < 0.01, "sum {total}");
        for w in widths {
            assert!(*w >= MIN_COLUMN_WIDTH - 1e-9 && *w <= MAX_COLUMN_WIDTH + 1e-9, "{w}");
        }
    }

    #[test]
    fn test_profile() {
        let m = model(&["Name", "Score"], &[&["Ana", "10"], &["Bartholomew", "7%"]]);
        let profiles = profile_columns(&m);
        assert_eq!(profiles[0].max_text_length, 11);
        assert_eq!(profiles[0].min_text_length, 3);
        assert!((profiles[0].average_text_length - 7.0).abs() < 1e-9);
        assert!(!profiles[0].is_numeric_dominant);
        assert!(profiles[1].is_numeric_dominant);
    }

    #[test]
    fn test_widths_single_column() {
        let m = model(&["Only"], &[&["x"]]);
        assert!(column_widths(&m).is_empty());
    }

    #[test]
    fn test_widths_bounds() {
        assert_width_bounds(&widths_from_scores(&[1.0, 1.0]));
        assert_width_bounds(&widths_from_scores(&[1000.0, 0.0, 0.0]));
        assert_width_bounds(&widths_from_scores(&[0.0, 0.0, 0.0, 0.0]));
        assert_width_bounds(&widths_from_scores(&[3.0, 80.0, 2.0, 1.0, 50.0, 9.0]));
        assert_width_bounds(&widths_from_scores(&[1.0; 20]));
    }

    #[test]
    fn test_widths_follow_scores() {
        let widths = widths_from_scores(&[10.0, 30.0]);
        assert!(widths[1] > widths[0]);
        assert_width_bounds(&widths);
    }

    #[test]
    fn test_widths_too_many_columns() {
        let widths = widths_from_scores(&[1.0; 25]);
        assert!(widths.iter().all(|w| (*w - 4.0).abs() < 1e-9));
    }

    #[test]
    fn test_font_scale() {
        let narrow = model(&["a", "b"], &[&["x", "y"]]);
        assert_eq!(table_font_scale(&narrow), 1.0);
        let wide = model(&["a"; 11], &[&["x"; 11]]);
        assert_eq!(table_font_scale(&wide), 0.7);
        let wordy = model(&["a"; 6], &[&["a fairly long sentence in every single cell of this wide table"; 6]]);
        assert!((table_font_scale(&wordy) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_document_scale() {
        assert_eq!(document_font_scale(&[]), 0.95);
        assert_eq!(document_font_scale(&[1.0, 0.9]), 0.9);
        assert_eq!(document_font_scale(&[0.7, 1.0]), 0.8);
        assert_eq!(cell_padding(0.5), 4.0);
        assert!((cell_padding(1.0) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_id_column() {
        let m = model(&["#", "Name"], &[&["1", "a"]]);
        assert_eq!(id_column(&m), Some(0));
        let m = model(&["Name", "Rank"], &[&["a", "3"], &["b", "4"]]);
        assert_eq!(id_column(&m), Some(1));
        let m = model(&["Name", "Rank"], &[&["a", "3"], &["b", "9"]]);
        assert_eq!(id_column(&m), None);
        let m = model(&["No", "Name"], &[&["5", "a"], &["2", "b"]]);
        assert_eq!(id_column(&m), Some(0));
    }

    #[test]
    fn test_row_height() {
        let short = model(&["a", "b"], &[&["x", "y"], &["z", "w"]]);
        let widths = column_widths(&short);
        assert_eq!(row_height(&short, &widths, 1.0, 700.0).as_deref(), Some("1.9em"));

        let long_text = "word ".repeat(60);
        let long = model(&["a", "b"], &[&["x", long_text.trim()], &["z", "w"]]);
        let widths = column_widths(&long);
        let height = row_height(&long, &widths, 1.0, 700.0).unwrap();
        assert_ne!(height, "1.9em");
        assert!(height.ends_with("em"));

        let single = model(&["a"], &[&["x"]]);
        assert!(row_height(&single, &[], 1.0, 700.0).is_none());
    }

    #[test]
    fn test_css_number() {
        assert_eq!(css_number(0.95), "0.95");
        assert_eq!(css_number(2.8), "2.8");
        assert_eq!(css_number(50.0), "50");
        assert_eq!(css_number(33.3333), "33.33");
    }
}
