use super::Document;
use crate::error::{CellgridError, Result};
use cellgrid_engine::engine::{CellRef, EvalResult, VisitingSet, format_value};

impl Document {
    /// Text shown for a cell: literals verbatim, formulas evaluated.
    pub fn get_cell_display(&self, cell_ref: &CellRef) -> String {
        self.evaluator().display_cell(cell_ref)
    }

    /// Display text for 1-based `row` and column label `col`.
    pub fn display_for(&self, row: usize, col: &str) -> String {
        self.evaluator().display_for(row, col)
    }

    pub fn evaluate_cell(&self, cell_ref: &CellRef) -> EvalResult {
        self.evaluator().evaluate_cell(cell_ref)
    }

    /// Evaluate a formula body as though it were entered at `cell_ref`,
    /// without storing it. A leading `=` is optional.
    pub fn evaluate_formula_at(&self, formula: &str, cell_ref: &CellRef) -> Result<EvalResult> {
        if !self.extent.contains(cell_ref) {
            return Err(CellgridError::OutOfBounds(*cell_ref));
        }
        let trimmed = formula.trim();
        let body = trimmed.strip_prefix('=').unwrap_or(trimmed);
        Ok(self
            .evaluator()
            .evaluate_formula_in(body, cell_ref, &mut VisitingSet::new()))
    }

    /// Like [`Document::evaluate_formula_at`], formatted for display.
    pub fn display_formula_at(&self, formula: &str, cell_ref: &CellRef) -> Result<String> {
        Ok(format_value(&self.evaluate_formula_at(formula, cell_ref)?))
    }
}
