//! Sheet extent: which columns and rows exist.
//!
//! References outside the extent are not errors; the evaluator treats them
//! as the number 0 without reading the store.

use serde::{Deserialize, Serialize};

use super::cell_ref::CellRef;

/// Default number of columns (A..R).
pub const DEFAULT_COLUMNS: usize = 18;
/// Default number of rows.
pub const DEFAULT_ROWS: usize = 27;

/// The columns (ordered letter labels) and row count of a sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetExtent {
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl SheetExtent {
    pub fn new(columns: Vec<String>, row_count: usize) -> Self {
        let columns = columns.into_iter().map(|c| c.to_ascii_uppercase()).collect();
        SheetExtent { columns, row_count }
    }

    /// Extent with `column_count` consecutive columns starting at `A`.
    pub fn with_size(column_count: usize, row_count: usize) -> Self {
        let columns = (0..column_count).map(CellRef::col_to_letters).collect();
        SheetExtent { columns, row_count }
    }

    /// Whether the column label (any case) belongs to the sheet.
    pub fn has_column(&self, label: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(label))
    }

    /// Check a 1-based row and a 0-based column index against the extent.
    pub fn is_valid_cell(&self, row: usize, col_index: usize) -> bool {
        row >= 1 && row <= self.row_count && self.has_column(&CellRef::col_to_letters(col_index))
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.is_valid_cell(cell.row + 1, cell.col)
    }
}

impl Default for SheetExtent {
    fn default() -> Self {
        Self::with_size(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}
