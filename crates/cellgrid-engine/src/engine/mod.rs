//! Spreadsheet engine API.
//!
//! This module provides the formula interpreter for the cell grid:
//!
//! - [`CellRef`], [`SheetExtent`] - Cell references (A1 notation ↔ row/col indices) and sheet bounds
//! - [`CellContent`], [`CellSource`], [`Grid`] - Raw cell storage and how it is read
//! - [`parse_formula`], [`Expr`] - Formula bodies as syntax trees
//! - [`Evaluator`] - Cell resolution, range expansion, functions and evaluation
//! - [`VisitingSet`] - Cycle guard for one resolution path
//! - [`format_value`] - Format results for display

mod ast;
mod cell;
mod cell_ref;
mod eval;
mod extent;
mod format;
mod functions;
mod parser;
mod range;
mod value;
mod visiting;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use cell::{CellContent, CellSource, Grid};
pub use cell_ref::CellRef;
pub use eval::{DEFAULT_MAX_DEPTH, Evaluator, MAX_RECURSION};
pub use extent::{DEFAULT_COLUMNS, DEFAULT_ROWS, SheetExtent};
pub use format::{format_number, format_value};
pub use functions::{BUILTINS, Builtin, Function};
pub use parser::{MAX_NESTING, ParseError, parse_formula};
pub use range::{MAX_RANGE_CELLS, normalize, range_cells};
pub use value::{CYCLE_TOKEN, EvalError, EvalResult, INVALID_TOKEN, Scalar, parse_number};
pub use visiting::{PathGuard, VisitingSet};
