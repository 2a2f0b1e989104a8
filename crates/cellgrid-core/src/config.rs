//! Sheet configuration loaded from TOML.
//!
//! ```toml
//! columns = 18
//! rows = 27
//! max_depth = 256
//! ```
//!
//! Every key is optional.

use crate::error::{CellgridError, Result};
use cellgrid_engine::engine::{
    DEFAULT_COLUMNS, DEFAULT_MAX_DEPTH, DEFAULT_ROWS, MAX_RECURSION, SheetExtent,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_CONFIG_FILE_BYTES: u64 = 64 * 1024;

/// Largest column count: every one- and two-letter label (A..ZZ).
pub const MAX_COLUMNS: usize = 702;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Number of columns, labelled A, B, ... in order.
    pub columns: usize,
    /// Number of rows (1-based labels 1..=rows).
    pub rows: usize,
    /// Longest chain of formulas evaluated before giving up with `#ERR`.
    pub max_depth: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SheetConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(CellgridError::InvalidConfig(format!(
                "refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded sheet config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SheetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.columns > MAX_COLUMNS {
            return Err(CellgridError::InvalidConfig(format!(
                "columns must be between 1 and {}, got {}",
                MAX_COLUMNS, self.columns
            )));
        }
        if self.rows == 0 {
            return Err(CellgridError::InvalidConfig("rows must be at least 1".to_string()));
        }
        if self.max_depth == 0 || self.max_depth > MAX_RECURSION {
            return Err(CellgridError::InvalidConfig(format!(
                "max_depth must be between 1 and {}, got {}",
                MAX_RECURSION, self.max_depth
            )));
        }
        Ok(())
    }

    pub fn extent(&self) -> SheetExtent {
        SheetExtent::with_size(self.columns, self.rows)
    }
}
