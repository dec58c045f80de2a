//! # gridcalc
//!
//! Spreadsheet-style cells whose value is an arithmetic formula over numeric
//! literals and other cells.
//!
//! ## Features
//!
//! - Formula parsing and evaluation (`+ - * /`, unary minus, parentheses)
//! - Cell references resolved transitively from each cell's raw formula
//! - Pluggable storage: in memory or a JSON file
//! - Bounded lookups and nesting per evaluation, so reference cycles and
//!   deeply nested formulas fail with an error instead of overflowing the stack
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let service = CellService::new(MemoryStore::new());
//!
//! service.upsert_cell("sheet1", "A1", "2").unwrap();
//! service.upsert_cell("sheet1", "A2", "=A1+A1").unwrap();
//! service.upsert_cell("sheet1", "A3", "=A2-1").unwrap();
//!
//! let cell = service.upsert_cell("sheet1", "A4", "A1*(-A2+A3)/0.5").unwrap();
//! assert_eq!(cell.result, "-4");
//! ```

pub mod error;
pub mod options;
pub mod prelude;
pub mod report;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use options::ServiceOptions;
pub use report::{format_result, ErrorReport, Sheet, ERROR_RESULT};
pub use service::CellService;

// Re-export core types
pub use gridcalc_core::{
    normalize_id, Cell, CellKey, CellStore, Error as StoreError, JsonFileStore, MemoryStore,
    StoreSource,
};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, evaluate_formula, evaluate_with_max_depth, parse, parse_with_max_depth, source_fn,
    FormulaError, FormulaResult, FormulaSource, Node, Operator, Tree,
};
