//! Markdown export of the evaluated sheet.

use crate::document::Document;
use std::fmt::Write as _;
use std::path::Path;

/// Write the evaluated sheet to a markdown file
pub fn write_markdown(path: &Path, doc: &Document) -> std::io::Result<()> {
    std::fs::write(path, markdown_content(doc))
}

/// Render the sheet as a markdown table. The table starts at A1 and stops at
/// the last row and column holding a cell inside the sheet.
pub fn markdown_content(doc: &Document) -> String {
    let mut out = String::from("# Sheet\n\n");

    let Some((max_row, max_col)) = find_grid_bounds(doc) else {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    };
    let labels = &doc.extent.columns[..=max_col];

    out.push_str("|   |");
    for label in labels {
        let _ = write!(out, " {} |", label);
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in labels {
        out.push_str("---|");
    }
    out.push('\n');

    for row in 1..=max_row + 1 {
        let _ = write!(out, "| {} |", row);
        for label in labels {
            let display = doc.display_for(row, label);
            if display.is_empty() {
                out.push_str("  |");
            } else {
                let _ = write!(out, " {} |", escape_markdown(&display));
            }
        }
        out.push('\n');
    }

    out
}

/// Zero-based (row, column index into the extent) of the furthest occupied
/// cell inside the sheet.
fn find_grid_bounds(doc: &Document) -> Option<(usize, usize)> {
    let mut bounds: Option<(usize, usize)> = None;
    for entry in doc.grid.iter() {
        let cell_ref = entry.key();
        if !doc.extent.contains(cell_ref) || entry.value().trim().is_empty() {
            continue;
        }
        let label = cell_ref.col_label();
        let Some(col_index) = doc.extent.columns.iter().position(|c| *c == label) else {
            continue;
        };
        let (max_row, max_col) = bounds.unwrap_or((0, 0));
        bounds = Some((max_row.max(cell_ref.row), max_col.max(col_index)));
    }
    bounds
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
