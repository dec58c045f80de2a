//! Cell storage
//!
//! - [`CellStore`] - the storage contract the service layer is written against
//! - [`MemoryStore`] - thread-safe in-memory storage
//! - [`JsonFileStore`] - a single JSON document on disk
//! - [`StoreSource`] - exposes any store as a [`FormulaSource`]

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use gridcalc_formula::{FormulaError, FormulaResult, FormulaSource};

use crate::cell::Cell;
use crate::error::{Error, Result};

/// Storage for cell records, keyed by (sheet, cell)
///
/// Identifiers are used exactly as given; normalization is up to the caller.
pub trait CellStore {
    /// Fetch one cell, or [`Error::NotFound`]
    fn get(&self, sheet: &str, cell: &str) -> Result<Cell>;

    /// All cells of a sheet, ordered by cell id. An unknown sheet is empty.
    fn list(&self, sheet: &str) -> Result<Vec<Cell>>;

    /// Store a new cell, or [`Error::AlreadyExists`]
    fn insert(&self, cell: Cell) -> Result<()>;

    /// Replace an existing cell, or [`Error::NotFound`]
    fn update(&self, cell: Cell) -> Result<()>;

    fn contains(&self, sheet: &str, cell: &str) -> Result<bool> {
        match self.get(sheet, cell) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Adapter serving stored cell values as formula text
pub struct StoreSource<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: CellStore + ?Sized> StoreSource<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: CellStore + ?Sized> FormulaSource for StoreSource<'_, S> {
    fn formula(&self, sheet: &str, cell: &str) -> FormulaResult<String> {
        match self.store.get(sheet, cell) {
            Ok(found) => Ok(found.value),
            Err(Error::NotFound { cell, .. }) => Err(FormulaError::NotFound(cell)),
            Err(e) => Err(FormulaError::source(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_formula::evaluate_formula;

    #[test]
    fn test_store_source_resolves_values() {
        let store = MemoryStore::new();
        store.insert(Cell::new("s", "x", "2+2").with_result("4")).unwrap();

        let source = StoreSource::new(&store);
        assert_eq!(source.formula("s", "x").unwrap(), "2+2");
        assert_eq!(evaluate_formula("x+(x-1)", "s", &source).unwrap(), 7.0);
    }

    #[test]
    fn test_store_source_not_found() {
        let store = MemoryStore::new();
        let source = StoreSource::new(&store);
        assert_eq!(
            source.formula("s", "missing"),
            Err(FormulaError::NotFound("missing".into()))
        );
    }

    #[test]
    fn test_contains() {
        let store = MemoryStore::new();
        store.insert(Cell::new("s", "a", "1")).unwrap();
        assert!(store.contains("s", "a").unwrap());
        assert!(!store.contains("s", "b").unwrap());
        assert!(!store.contains("t", "a").unwrap());
    }
}
