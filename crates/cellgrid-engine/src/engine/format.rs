use super::cell::{CellContent, CellSource};
use super::cell_ref::CellRef;
use super::eval::Evaluator;
use super::value::{EvalResult, INVALID_TOKEN, Scalar};
use super::visiting::VisitingSet;

/// Format an evaluation result for display. Errors render as their tokens.
pub fn format_value(value: &EvalResult) -> String {
    match value {
        Ok(Scalar::Number(n)) => format_number(*n),
        Ok(Scalar::Text(s)) => s.clone(),
        Err(e) => e.token().to_string(),
    }
}

/// Format a number for display (shortest form that reads back the same).
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        INVALID_TOKEN.to_string()
    } else if n == 0.0 {
        // Also covers -0.
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl<S: CellSource + ?Sized> Evaluator<'_, S> {
    /// Display text for the cell at 1-based `row` and column label `col`.
    pub fn display_for(&self, row: usize, col: &str) -> String {
        match CellRef::from_row_label(row, col) {
            Some(cell) => self.display_cell(&cell),
            None => String::new(),
        }
    }

    /// Literals display verbatim; formulas display their evaluated value.
    pub fn display_cell(&self, cell: &CellRef) -> String {
        let raw = self.source().raw(cell).unwrap_or_default();
        match CellContent::classify(&raw) {
            CellContent::Formula(body) => {
                format_value(&self.evaluate_formula_in(body, cell, &mut VisitingSet::new()))
            }
            _ => raw,
        }
    }
}
