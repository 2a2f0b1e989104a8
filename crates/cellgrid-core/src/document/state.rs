use crate::config::SheetConfig;
use crate::error::Result;
use cellgrid_engine::engine::{Evaluator, Grid, SheetExtent};
use std::path::PathBuf;

/// UI-agnostic document state for one sheet.
pub struct Document {
    /// Raw cell contents (DashMap is internally Arc-based, clones are cheap)
    pub grid: Grid,
    /// Columns and rows that exist on this sheet
    pub extent: SheetExtent,
    /// Longest formula chain evaluated before `#ERR`
    pub max_depth: usize,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the grid has been modified since the last load/save
    pub modified: bool,
}

impl Document {
    /// Create an empty document with the default sheet size.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_config(&SheetConfig::default())
    }

    pub fn with_config(config: &SheetConfig) -> Self {
        Document {
            grid: Grid::default(),
            extent: config.extent(),
            max_depth: config.max_depth,
            file_path: None,
            modified: false,
        }
    }

    /// Create a document and load `path` into it when given.
    pub fn with_file(path: Option<PathBuf>, config: &SheetConfig) -> Result<Self> {
        let mut doc = Self::with_config(config);
        if let Some(path) = path {
            doc.load_file(&path)?;
        }
        Ok(doc)
    }

    /// Evaluator over the current grid.
    pub fn evaluator(&self) -> Evaluator<'_, Grid> {
        Evaluator::new(&self.grid, &self.extent).with_max_depth(self.max_depth)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
