//! Raw cell storage and content classification.
//!
//! Cells are stored exactly as typed. Whether a cell holds a number, text or
//! a formula is decided on every read by [`CellContent::classify`], so the
//! store never carries derived state:
//! - [`CellContent`] - How a raw string is interpreted
//! - [`CellSource`] - Read access the evaluator needs from a store
//! - [`Grid`] - Thread-safe sparse storage for raw contents (backed by `DashMap`)

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

use super::cell_ref::CellRef;
use super::value::parse_number;

/// Interpretation of a raw cell string.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent<'a> {
    Empty,
    Number(f64),
    Text(&'a str),
    /// Formula body, without the leading '='.
    Formula(&'a str),
}

impl<'a> CellContent<'a> {
    /// Classify raw input.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Formula (without the '=')
    /// - Numeric-looking -> Number
    /// - Otherwise -> Text (verbatim)
    pub fn classify(raw: &'a str) -> CellContent<'a> {
        if let Some(body) = raw.strip_prefix('=') {
            return CellContent::Formula(body);
        }
        if raw.trim().is_empty() {
            return CellContent::Empty;
        }
        match parse_number(raw) {
            Some(n) => CellContent::Number(n),
            None => CellContent::Text(raw),
        }
    }
}

/// Read access to raw cell contents. Absence means an empty cell.
pub trait CellSource {
    fn raw(&self, cell: &CellRef) -> Option<String>;
}

/// Thread-safe sparse grid storage of raw contents.
pub type Grid = Arc<DashMap<CellRef, String>>;

impl CellSource for DashMap<CellRef, String> {
    fn raw(&self, cell: &CellRef) -> Option<String> {
        self.get(cell).map(|entry| entry.value().clone())
    }
}

impl CellSource for HashMap<CellRef, String> {
    fn raw(&self, cell: &CellRef) -> Option<String> {
        self.get(cell).cloned()
    }
}

impl<S: CellSource + ?Sized> CellSource for Arc<S> {
    fn raw(&self, cell: &CellRef) -> Option<String> {
        (**self).raw(cell)
    }
}

impl<S: CellSource + ?Sized> CellSource for &S {
    fn raw(&self, cell: &CellRef) -> Option<String> {
        (**self).raw(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(CellContent::classify(""), CellContent::Empty);
        assert_eq!(CellContent::classify("   "), CellContent::Empty);
        assert_eq!(CellContent::classify("12.5"), CellContent::Number(12.5));
        assert_eq!(CellContent::classify("hello"), CellContent::Text("hello"));
        assert_eq!(CellContent::classify("=A1+1"), CellContent::Formula("A1+1"));
        assert_eq!(CellContent::classify("="), CellContent::Formula(""));
    }

    #[test]
    fn test_grid_source_reads_raw() {
        let grid: Grid = Arc::new(DashMap::new());
        grid.insert(CellRef::new(0, 0), "=1+1".to_string());
        assert_eq!(grid.raw(&CellRef::new(0, 0)).as_deref(), Some("=1+1"));
        assert_eq!(grid.raw(&CellRef::new(1, 0)), None);
    }
}
