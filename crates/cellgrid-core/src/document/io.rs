use super::Document;
use crate::error::{CellgridError, Result};
use crate::storage::{parse_grd, write_grd};
use std::path::{Path, PathBuf};
use tracing::debug;

impl Document {
    /// Save to the current file path
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = &self.file_path else {
            return Err(CellgridError::NoFilePath);
        };

        write_grd(path, &self.grid)?;
        debug!(path = %path.display(), cells = self.grid.len(), "saved sheet");
        self.modified = false;
        Ok(path.clone())
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        self.file_path = Some(path.to_path_buf());
        self.save_file()
    }

    /// Load from file. Nothing is replaced if the file cannot be read or
    /// holds a cell outside the sheet.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let grid = parse_grd(path)?;

        if let Some(outside) = grid
            .iter()
            .map(|entry| *entry.key())
            .filter(|cell_ref| !self.extent.contains(cell_ref))
            .min()
        {
            return Err(CellgridError::OutOfBounds(outside));
        }

        debug!(path = %path.display(), cells = grid.len(), "loaded sheet");
        self.grid = grid;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}
