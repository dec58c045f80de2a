//! Formula error types

use std::num::ParseFloatError;

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Unmatched or unterminated parenthesis
    #[error("invalid parentheses")]
    InvalidParentheses,

    /// Misplaced operator or character, or two operands without an operator
    #[error("invalid operation")]
    InvalidOperation,

    /// The formula nests groups deeper than the allowed depth
    #[error("formula nested deeper than {0} levels")]
    NestingLimit(usize),

    /// The formula source has no cell with this identifier
    #[error("cell not found: {0}")]
    NotFound(String),

    /// A numeric literal that does not convert to a float
    #[error("invalid number '{literal}': {source}")]
    NumericParse {
        literal: String,
        #[source]
        source: ParseFloatError,
    },

    /// The formula source failed for a reason other than a missing cell
    #[error("formula source error: {0}")]
    Source(String),
}

impl FormulaError {
    /// Create a source error from anything printable
    pub fn source<S: Into<String>>(msg: S) -> Self {
        FormulaError::Source(msg.into())
    }
}
