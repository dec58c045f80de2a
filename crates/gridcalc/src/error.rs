//! Service error types

use gridcalc_formula::FormulaError;
use thiserror::Error;

/// Result type alias using [`ServiceError`]
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Errors returned by [`CellService`](crate::CellService)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The formula could not be parsed or evaluated
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// The cell store failed
    #[error(transparent)]
    Store(#[from] gridcalc_core::Error),

    /// Blank formula text
    #[error("value is required")]
    ValueRequired,

    /// A sheet without any cells
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// Evaluation needed more cell lookups than allowed, usually a reference cycle
    #[error("resolution limit of {0} cell lookups exceeded")]
    ResolutionLimit(usize),
}

impl ServiceError {
    /// Whether the error means "no such cell or sheet", as opposed to bad input
    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::Store(e) => e.is_not_found(),
            ServiceError::SheetNotFound(_) => true,
            _ => false,
        }
    }
}
