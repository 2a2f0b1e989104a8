use super::Document;
use crate::error::{CellgridError, Result};
use cellgrid_engine::engine::CellRef;
use tracing::debug;

impl Document {
    /// Store raw user input in a cell. Input is kept verbatim; blank input
    /// empties the cell.
    pub fn set_cell_from_input(&mut self, cell_ref: CellRef, input: &str) -> Result<()> {
        if !self.extent.contains(&cell_ref) {
            return Err(CellgridError::OutOfBounds(cell_ref));
        }
        if input.trim().is_empty() {
            self.clear_cell(&cell_ref);
            return Ok(());
        }
        debug!(cell = %cell_ref, input, "set cell");
        self.grid.insert(cell_ref, input.to_string());
        self.modified = true;
        Ok(())
    }

    /// Set a cell named in A1 notation.
    pub fn set_cell_by_name(&mut self, name: &str, input: &str) -> Result<CellRef> {
        let cell_ref = CellRef::from_str(name)
            .ok_or_else(|| CellgridError::InvalidCellRef(name.to_string()))?;
        self.set_cell_from_input(cell_ref, input)?;
        Ok(cell_ref)
    }

    pub fn clear_cell(&mut self, cell_ref: &CellRef) {
        if self.grid.remove(cell_ref).is_some() {
            debug!(cell = %cell_ref, "cleared cell");
            self.modified = true;
        }
    }

    /// Raw stored text, if any.
    pub fn get_raw(&self, cell_ref: &CellRef) -> Option<String> {
        self.grid.get(cell_ref).map(|entry| entry.value().clone())
    }

    /// Occupied cells sorted by row, then column.
    pub fn occupied_cells(&self) -> Vec<CellRef> {
        let mut cells: Vec<CellRef> = self.grid.iter().map(|entry| *entry.key()).collect();
        cells.sort_by(|a, b| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;

    #[test]
    fn test_set_cell_stores_raw_input_verbatim() {
        let mut doc = Document::new();
        let a1 = CellRef::new(0, 0);
        doc.set_cell_from_input(a1, " =1 + 2 ").unwrap();
        assert_eq!(doc.get_raw(&a1).as_deref(), Some(" =1 + 2 "));
        assert!(doc.modified);
    }

    #[test]
    fn test_blank_input_removes_cell() {
        let mut doc = Document::new();
        let a1 = CellRef::new(0, 0);
        doc.set_cell_from_input(a1, "5").unwrap();
        doc.set_cell_from_input(a1, "   ").unwrap();
        assert_eq!(doc.get_raw(&a1), None);
        assert!(doc.grid.is_empty());
    }

    #[test]
    fn test_write_outside_extent_is_rejected() {
        let config = SheetConfig {
            columns: 2,
            rows: 2,
            ..SheetConfig::default()
        };
        let mut doc = Document::with_config(&config);
        assert!(matches!(
            doc.set_cell_from_input(CellRef::new(2, 0), "1"),
            Err(CellgridError::OutOfBounds(_))
        ));
        assert!(matches!(
            doc.set_cell_from_input(CellRef::new(0, 2), "1"),
            Err(CellgridError::OutOfBounds(_))
        ));
        assert!(doc.grid.is_empty());
        assert!(!doc.modified);
    }

    #[test]
    fn test_set_cell_by_name() {
        let mut doc = Document::new();
        let cell = doc.set_cell_by_name("b3", "hi").unwrap();
        assert_eq!(cell, CellRef::new(1, 2));
        assert!(matches!(
            doc.set_cell_by_name("3B", "hi"),
            Err(CellgridError::InvalidCellRef(_))
        ));
    }

    #[test]
    fn test_occupied_cells_are_row_major() {
        let mut doc = Document::new();
        doc.set_cell_by_name("B2", "1").unwrap();
        doc.set_cell_by_name("A2", "1").unwrap();
        doc.set_cell_by_name("C1", "1").unwrap();
        let names: Vec<String> = doc.occupied_cells().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["C1", "A2", "B2"]);
    }
}
