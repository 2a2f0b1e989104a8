//! Formula evaluation.
//!
//! [`Evaluator`] resolves cells against a [`CellSource`] and evaluates
//! formula bodies. Evaluation is pure: nothing is cached between calls and
//! the only mutable state is the [`VisitingSet`] threaded through one call
//! tree. A formula either produces a [`Scalar`] or one of the two
//! [`EvalError`] values; nothing panics on user input.
//!
//! Recursion is bounded twice: the resolution path may hold at most
//! `max_depth` cells, and the evaluator as a whole may nest at most
//! [`MAX_RECURSION`] formula or expression frames. Breaking either limit
//! makes the outermost formula [`EvalError::Invalid`], even where an
//! aggregate would otherwise coerce the failure to 0.

use std::cell::Cell;

use tracing::{debug, trace};

use super::ast::{Expr, UnaryOperator};
use super::cell::{CellContent, CellSource};
use super::cell_ref::CellRef;
use super::extent::SheetExtent;
use super::parser::parse_formula;
use super::value::{EvalError, EvalResult, Scalar};
use super::visiting::VisitingSet;

/// Longest resolution path (cells mid-evaluation) before a formula is
/// reported as invalid.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Nested formula and expression frames allowed in one evaluation. Keeps
/// the native stack well inside a default 8 MiB main thread.
pub const MAX_RECURSION: usize = 1024;

/// Formula evaluator bound to a cell store and a sheet extent.
pub struct Evaluator<'a, S: CellSource + ?Sized> {
    source: &'a S,
    extent: &'a SheetExtent,
    max_depth: usize,
    frames: Cell<usize>,
    exhausted: Cell<bool>,
}

/// One unit of [`MAX_RECURSION`]; released on drop.
struct Frame<'a> {
    frames: &'a Cell<usize>,
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.frames.set(self.frames.get().saturating_sub(1));
    }
}

impl<'a, S: CellSource + ?Sized> Evaluator<'a, S> {
    pub fn new(source: &'a S, extent: &'a SheetExtent) -> Self {
        Evaluator {
            source,
            extent,
            max_depth: DEFAULT_MAX_DEPTH,
            frames: Cell::new(0),
            exhausted: Cell::new(false),
        }
    }

    /// Set the resolution path limit, capped at [`MAX_RECURSION`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_RECURSION);
        self
    }

    pub fn extent(&self) -> &SheetExtent {
        self.extent
    }

    pub(crate) fn source(&self) -> &S {
        self.source
    }

    /// Take one recursion frame, or mark the evaluation exhausted.
    fn enter_frame(&self) -> Option<Frame<'_>> {
        let used = self.frames.get() + 1;
        if used > MAX_RECURSION {
            self.exhausted.set(true);
            return None;
        }
        self.frames.set(used);
        Some(Frame {
            frames: &self.frames,
        })
    }

    /// Evaluate a formula body as though it were entered at the cell with
    /// 1-based `row` and column label `col`, starting a fresh resolution path.
    pub fn evaluate_formula(&self, body: &str, row: usize, col: &str) -> EvalResult {
        let Some(cell) = CellRef::from_row_label(row, col) else {
            return Err(EvalError::Invalid);
        };
        self.evaluate_formula_in(body, &cell, &mut VisitingSet::new())
    }

    /// Evaluate a formula body entered at `cell` on the path `visiting`.
    ///
    /// The cell is on the path for the duration of the call and removed again
    /// before returning, so `visiting` is left exactly as it was.
    pub fn evaluate_formula_in(
        &self,
        body: &str,
        cell: &CellRef,
        visiting: &mut VisitingSet,
    ) -> EvalResult {
        let outermost = self.frames.get() == 0;
        let result = self.evaluate_on_path(body, cell, visiting);
        if self.exhausted.get() {
            if outermost {
                self.exhausted.set(false);
            }
            return Err(EvalError::Invalid);
        }
        if let Err(e) = &result {
            debug!(cell = %cell, error = ?e, "formula evaluated to an error");
        }
        result
    }

    fn evaluate_on_path(&self, body: &str, cell: &CellRef, visiting: &mut VisitingSet) -> EvalResult {
        let Some(path) = visiting.enter(*cell) else {
            debug!(cell = %cell, "cycle detected");
            return Err(EvalError::Cycle);
        };
        let Some(_frame) = self.enter_frame().filter(|_| path.len() <= self.max_depth) else {
            debug!(cell = %cell, depth = path.len(), "resolution too deep");
            self.exhausted.set(true);
            return Err(EvalError::Invalid);
        };

        let expr = match parse_formula(body) {
            Ok(expr) => expr,
            Err(e) => {
                debug!(cell = %cell, error = %e, "formula rejected");
                return Err(EvalError::Invalid);
            }
        };

        self.eval_body(&expr, &path)
    }

    /// Evaluate the stored content of `cell` with a fresh resolution path.
    pub fn evaluate_cell(&self, cell: &CellRef) -> EvalResult {
        self.resolve(cell, &VisitingSet::new())
    }

    /// Resolve one cell to a value: empty is 0, numeric-looking text is a
    /// number, other text is returned as is and formulas are evaluated on a
    /// copy of `visiting`, so sibling references cannot disturb each other.
    pub fn resolve(&self, cell: &CellRef, visiting: &VisitingSet) -> EvalResult {
        trace!(cell = %cell, depth = visiting.len(), "resolving");
        let Some(raw) = self.source.raw(cell) else {
            return Ok(Scalar::Number(0.0));
        };
        match CellContent::classify(&raw) {
            CellContent::Empty => Ok(Scalar::Number(0.0)),
            CellContent::Number(n) => Ok(Scalar::Number(n)),
            CellContent::Text(text) => Ok(Scalar::Text(text.to_string())),
            CellContent::Formula(body) => {
                let mut branch = visiting.clone();
                self.evaluate_formula_in(body, cell, &mut branch)
            }
        }
    }

    /// Value of a reference used as an operand: out-of-extent cells are 0,
    /// text is 0, errors are returned unchanged.
    pub(crate) fn reference_value(&self, cell: &CellRef, visiting: &VisitingSet) -> EvalResult {
        if !self.extent.contains(cell) {
            return Ok(Scalar::Number(0.0));
        }
        let value = self.resolve(cell, visiting)?;
        Ok(Scalar::Number(value.to_number_or_zero()))
    }

    /// Top-level result of a formula body. A body that is a single reference
    /// passes the referenced error through; otherwise the result must be text
    /// or a finite number.
    fn eval_body(&self, expr: &Expr, visiting: &VisitingSet) -> EvalResult {
        if let Some(cell) = expr.as_ref_target() {
            return self.reference_value(cell, visiting);
        }
        match self.eval_expr(expr, visiting)? {
            Scalar::Number(n) if !n.is_finite() => Err(EvalError::Invalid),
            value => Ok(value),
        }
    }

    /// Evaluate an expression in arithmetic position. Comparisons, bare
    /// ranges and bare words are invalid here; an error used as an operand
    /// degrades to [`EvalError::Invalid`].
    pub(crate) fn eval_expr(&self, expr: &Expr, visiting: &VisitingSet) -> EvalResult {
        let Some(_frame) = self.enter_frame() else {
            return Err(EvalError::Invalid);
        };
        match expr {
            Expr::Number(n) => Ok(Scalar::Number(*n)),
            Expr::Text(s) => Ok(Scalar::Text(s.clone())),
            Expr::Word(_) | Expr::Malformed(_) | Expr::Range(..) => Err(EvalError::Invalid),
            Expr::Ref(cell) => self.reference_value(cell, visiting),
            Expr::Unary { op, operand } => {
                let n = self.operand(operand, visiting)?;
                Ok(Scalar::Number(match op {
                    UnaryOperator::Negate => -n,
                    UnaryOperator::Plus => n,
                }))
            }
            Expr::Binary { op, left, right } => {
                if op.is_comparison() {
                    return Err(EvalError::Invalid);
                }
                let l = self.operand(left, visiting)?;
                let r = self.operand(right, visiting)?;
                Ok(Scalar::Number(op.apply(l, r)))
            }
            Expr::Call { function, args } => self.eval_call(*function, args, visiting),
        }
    }

    fn operand(&self, expr: &Expr, visiting: &VisitingSet) -> Result<f64, EvalError> {
        match self.eval_expr(expr, visiting) {
            Ok(Scalar::Number(n)) => Ok(n),
            Ok(Scalar::Text(_)) | Err(_) => Err(EvalError::Invalid),
        }
    }
}
