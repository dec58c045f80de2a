//! Cell records and identifiers

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Normalize a sheet or cell identifier: surrounding whitespace removed, lowercased
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// A (sheet, cell) identifier pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub sheet: String,
    pub cell: String,
}

impl CellKey {
    pub fn new(sheet: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cell: cell.into(),
        }
    }
}

/// A stored cell: its raw formula text and the formatted result last computed from it
///
/// Identifiers are not part of the serialized record; they are the keys the
/// record is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(skip)]
    pub sheet_id: String,
    #[serde(skip)]
    pub cell_id: String,
    /// Raw formula text as entered
    pub value: String,
    /// Formatted result of the last evaluation
    pub result: String,
}

impl Cell {
    /// Create a cell with no result yet
    pub fn new(sheet_id: impl Into<String>, cell_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            cell_id: cell_id.into(),
            value: value.into(),
            result: String::new(),
        }
    }

    /// Builder-style setter for the computed result
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }

    pub fn key(&self) -> CellKey {
        CellKey::new(self.sheet_id.clone(), self.cell_id.clone())
    }

    /// Check that the record can be stored
    pub fn validate(&self) -> Result<()> {
        if self.sheet_id.is_empty() {
            return Err(Error::InvalidCell("empty sheet id".into()));
        }
        if self.cell_id.is_empty() {
            return Err(Error::InvalidCell("empty cell id".into()));
        }
        if self.value.is_empty() {
            return Err(Error::InvalidCell(format!(
                "empty value for {}/{}",
                self.sheet_id, self.cell_id
            )));
        }
        Ok(())
    }
}
