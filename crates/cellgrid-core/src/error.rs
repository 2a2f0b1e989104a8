//! Error types for Cellgrid core.

use thiserror::Error;

use cellgrid_engine::engine::CellRef;

/// Errors that can occur in the Cellgrid document layer
#[derive(Error, Debug)]
pub enum CellgridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Cell {0} is outside the sheet")]
    OutOfBounds(CellRef),

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, CellgridError>;
