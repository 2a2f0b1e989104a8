//! Range expansion.
//!
//! A range `A1:B3` denotes the rectangle between two corners, in either
//! order. Cells are visited row by row, left to right. Every cell of one
//! range is resolved against the same [`VisitingSet`]: the block is a single
//! resolution step, so a cycle reached from any cell fails the whole range.

use super::cell::CellSource;
use super::cell_ref::CellRef;
use super::eval::Evaluator;
use super::value::EvalError;
use super::visiting::VisitingSet;

/// Ranges with more cells than this are rejected as invalid.
pub const MAX_RANGE_CELLS: usize = 1_000_000;

/// Normalize two corners to (top-left, bottom-right).
pub fn normalize(start: &CellRef, end: &CellRef) -> (CellRef, CellRef) {
    (
        CellRef::new(start.col.min(end.col), start.row.min(end.row)),
        CellRef::new(start.col.max(end.col), start.row.max(end.row)),
    )
}

/// Number of cells in the rectangle, or None if it overflows.
pub fn range_len(start: &CellRef, end: &CellRef) -> Option<usize> {
    let (min, max) = normalize(start, end);
    let rows = max.row - min.row + 1;
    let cols = max.col - min.col + 1;
    rows.checked_mul(cols)
}

/// The cells of a range in row-major order.
pub fn range_cells(start: &CellRef, end: &CellRef) -> Vec<CellRef> {
    let (min, max) = normalize(start, end);
    (min.row..=max.row)
        .flat_map(|row| (min.col..=max.col).map(move |col| CellRef::new(col, row)))
        .collect()
}

impl<S: CellSource + ?Sized> Evaluator<'_, S> {
    /// Resolve every cell of a range to a number. Text, invalid values and
    /// cells outside the sheet count as 0; a cycle anywhere fails the range.
    pub fn expand_range(
        &self,
        start: &CellRef,
        end: &CellRef,
        visiting: &VisitingSet,
    ) -> Result<Vec<f64>, EvalError> {
        match range_len(start, end) {
            Some(n) if n <= MAX_RANGE_CELLS => {}
            _ => return Err(EvalError::Invalid),
        }

        let mut values = Vec::new();
        for cell in range_cells(start, end) {
            if !self.extent().contains(&cell) {
                values.push(0.0);
                continue;
            }
            match self.resolve(&cell, visiting) {
                Ok(v) => values.push(v.to_number_or_zero()),
                Err(EvalError::Cycle) => return Err(EvalError::Cycle),
                Err(EvalError::Invalid) => values.push(0.0),
            }
        }
        Ok(values)
    }
}
