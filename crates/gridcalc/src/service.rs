//! Cell service
//!
//! Sequences the formula engine and a [`CellStore`]: evaluate the submitted
//! formula against the stored cells of its sheet, then insert or update the
//! record with the formatted result.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let service = CellService::new(MemoryStore::new());
//! service.upsert_cell("sheet1", "x", "2+2").unwrap();
//!
//! let cell = service.upsert_cell("sheet1", "y", "X+(X-1)").unwrap();
//! assert_eq!(cell.result, "7");
//! ```

use std::cell::Cell as Counter;

use gridcalc_core::{normalize_id, Cell, CellStore, StoreSource};
use gridcalc_formula::{
    evaluate_with_max_depth, parse, parse_with_max_depth, FormulaError, FormulaResult,
    FormulaSource, Tree,
};

use crate::error::{ServiceError, ServiceResult};
use crate::options::ServiceOptions;
use crate::report::{format_result, Sheet};

/// Get, list and upsert cells on top of a store
#[derive(Debug)]
pub struct CellService<S> {
    store: S,
    options: ServiceOptions,
}

impl<S: CellStore> CellService<S> {
    /// Create a service with default options
    pub fn new(store: S) -> Self {
        Self::with_options(store, ServiceOptions::default())
    }

    pub fn with_options(store: S, options: ServiceOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch one stored cell
    pub fn get_cell(&self, sheet: &str, cell: &str) -> ServiceResult<Cell> {
        let sheet = self.id(sheet);
        let cell = self.id(cell);
        Ok(self.store.get(&sheet, &cell)?)
    }

    /// All cells of a sheet; a sheet without cells is [`ServiceError::SheetNotFound`]
    pub fn get_sheet(&self, sheet: &str) -> ServiceResult<Sheet> {
        let sheet = self.id(sheet);
        let cells = self.store.list(&sheet)?;
        if cells.is_empty() {
            return Err(ServiceError::SheetNotFound(sheet));
        }
        Ok(Sheet { id: sheet, cells })
    }

    /// Evaluate a formula against the cells of `sheet` without storing anything
    pub fn evaluate(&self, sheet: &str, formula: &str) -> ServiceResult<f64> {
        let sheet = self.id(sheet);
        let tree = self.parse(formula)?;

        let source = ServiceSource::new(&self.store, &self.options);
        let result = match self.options.max_depth {
            Some(max) => evaluate_with_max_depth(&tree, &sheet, &source, max),
            None => gridcalc_formula::evaluate(&tree, &sheet, &source),
        };
        match result {
            Ok(value) => Ok(value),
            Err(_) if source.exhausted() => Err(ServiceError::ResolutionLimit(
                self.options.max_resolutions.unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Evaluate `value` and store it with its result, creating the cell if needed
    ///
    /// Nothing is stored when the formula is rejected.
    pub fn upsert_cell(&self, sheet: &str, cell: &str, value: &str) -> ServiceResult<Cell> {
        if value.trim().is_empty() {
            return Err(ServiceError::ValueRequired);
        }

        let sheet = self.id(sheet);
        let cell = self.id(cell);

        let result = match self.evaluate(&sheet, value) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(sheet = %sheet, cell = %cell, value, error = %e, "rejected formula");
                return Err(e);
            }
        };

        let record = Cell::new(sheet.clone(), cell.clone(), value).with_result(format_result(result));

        if self.store.contains(&sheet, &cell)? {
            self.store.update(record.clone())?;
            tracing::debug!(sheet = %sheet, cell = %cell, result = %record.result, "updated cell");
        } else {
            self.store.insert(record.clone())?;
            tracing::debug!(sheet = %sheet, cell = %cell, result = %record.result, "created cell");
        }

        Ok(record)
    }

    /// Parse a formula under the configured nesting bound
    pub fn parse(&self, formula: &str) -> ServiceResult<Tree> {
        let tree = match self.options.max_depth {
            Some(max) => parse_with_max_depth(formula, max)?,
            None => parse(formula)?,
        };
        Ok(tree)
    }

    fn id(&self, id: &str) -> String {
        if self.options.normalize_ids {
            normalize_id(id)
        } else {
            id.to_string()
        }
    }
}

/// Formula source for one evaluation: normalizes references and counts lookups
struct ServiceSource<'a, S: ?Sized> {
    inner: StoreSource<'a, S>,
    normalize_ids: bool,
    limit: Option<usize>,
    lookups: Counter<usize>,
    exhausted: Counter<bool>,
}

impl<'a, S: CellStore + ?Sized> ServiceSource<'a, S> {
    fn new(store: &'a S, options: &ServiceOptions) -> Self {
        Self {
            inner: StoreSource::new(store),
            normalize_ids: options.normalize_ids,
            limit: options.max_resolutions,
            lookups: Counter::new(0),
            exhausted: Counter::new(false),
        }
    }

    fn exhausted(&self) -> bool {
        self.exhausted.get()
    }
}

impl<S: CellStore + ?Sized> FormulaSource for ServiceSource<'_, S> {
    fn formula(&self, sheet: &str, cell: &str) -> FormulaResult<String> {
        let lookups = self.lookups.get() + 1;
        if let Some(limit) = self.limit {
            if lookups > limit {
                self.exhausted.set(true);
                return Err(FormulaError::source(format!(
                    "more than {limit} cell lookups"
                )));
            }
        }
        self.lookups.set(lookups);

        if self.normalize_ids {
            self.inner.formula(sheet, &normalize_id(cell))
        } else {
            self.inner.formula(sheet, cell)
        }
    }
}
