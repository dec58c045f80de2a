//! # gridcalc-core
//!
//! Cell records and storage for gridcalc.
//!
//! This crate provides:
//! - [`Cell`] and [`CellKey`] - a stored formula and the (sheet, cell) pair naming it
//! - [`CellStore`] - the storage contract, with [`MemoryStore`] and [`JsonFileStore`]
//! - [`StoreSource`] - serves stored formulas to the evaluator
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{Cell, CellStore, MemoryStore, StoreSource};
//! use gridcalc_formula::evaluate_formula;
//!
//! let store = MemoryStore::new();
//! store.insert(Cell::new("sheet1", "x", "2+2").with_result("4")).unwrap();
//!
//! let result = evaluate_formula("x*10", "sheet1", &StoreSource::new(&store)).unwrap();
//! assert_eq!(result, 40.0);
//! ```

pub mod cell;
pub mod error;
pub mod store;

pub use cell::{normalize_id, Cell, CellKey};
pub use error::{Error, Result};
pub use store::{CellStore, JsonFileStore, MemoryStore, StoreSource};
