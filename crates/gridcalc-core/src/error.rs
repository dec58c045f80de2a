//! Error types for gridcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc-core
#[derive(Debug, Error)]
pub enum Error {
    /// No cell stored under this key
    #[error("Cell not found: {sheet}/{cell}")]
    NotFound { sheet: String, cell: String },

    /// Insert of a cell that is already stored
    #[error("Cell already exists: {sheet}/{cell}")]
    AlreadyExists { sheet: String, cell: String },

    /// Record that cannot be stored (empty identifier or value)
    #[error("Invalid cell: {0}")]
    InvalidCell(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed store document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not-found error for a sheet/cell pair
    pub fn not_found(sheet: &str, cell: &str) -> Self {
        Error::NotFound {
            sheet: sheet.to_string(),
            cell: cell.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
