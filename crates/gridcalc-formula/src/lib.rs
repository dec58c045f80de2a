//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc cells.
//!
//! This crate provides:
//! - Formula parsing (text → [`Tree`])
//! - Formula evaluation (tree → `f64`), resolving cell references through a
//!   [`FormulaSource`]
//!
//! Supported syntax is deliberately small: numeric literals, cell
//! identifiers, `+ - * /`, unary minus and parentheses, with an optional
//! leading `=`.
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_formula::{evaluate, parse, source_fn, FormulaError};
//!
//! let tree = parse("=A1*(-A2+A3)/0.5")?;
//! let source = source_fn(|_sheet: &str, cell: &str| match cell {
//!     "A1" => Ok("2".to_string()),
//!     "A2" => Ok("=A1+A1".to_string()),
//!     "A3" => Ok("=A2-1".to_string()),
//!     other => Err(FormulaError::NotFound(other.to_string())),
//! });
//! assert_eq!(evaluate(&tree, "sheet1", &source)?, -4.0);
//! # Ok::<(), FormulaError>(())
//! ```

pub mod error;
pub mod evaluator;
pub mod node;
pub mod parser;

pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    evaluate, evaluate_formula, evaluate_with_max_depth, source_fn, FnSource, FormulaSource,
};
pub use node::{Node, Operator, Tree};
pub use parser::{parse, parse_with_max_depth};
