//! Cycle guard for formula evaluation.
//!
//! A [`VisitingSet`] holds the cells currently being evaluated along one
//! resolution path. Entering a cell returns a [`PathGuard`] that removes the
//! cell again when dropped, so the set is restored on every exit path.
//!
//! Resolving a single reference descends with a clone of the set, while all
//! cells of one range share the caller's set.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use super::cell_ref::CellRef;

/// Cells mid-evaluation on the active resolution path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitingSet {
    cells: HashSet<CellRef>,
}

impl VisitingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.cells.contains(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Add `cell` to the path. Returns None if it is already on it (a cycle).
    pub fn enter(&mut self, cell: CellRef) -> Option<PathGuard<'_>> {
        if !self.cells.insert(cell) {
            return None;
        }
        Some(PathGuard { set: self, cell })
    }
}

/// Membership of one cell in a [`VisitingSet`]; released on drop.
#[derive(Debug)]
pub struct PathGuard<'a> {
    set: &'a mut VisitingSet,
    cell: CellRef,
}

impl Deref for PathGuard<'_> {
    type Target = VisitingSet;

    fn deref(&self) -> &VisitingSet {
        self.set
    }
}

impl DerefMut for PathGuard<'_> {
    fn deref_mut(&mut self) -> &mut VisitingSet {
        self.set
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.set.cells.remove(&self.cell);
    }
}
