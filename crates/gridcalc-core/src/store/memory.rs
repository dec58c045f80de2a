//! In-memory cell storage

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::CellStore;
use crate::cell::{Cell, CellKey};
use crate::error::{Error, Result};

/// Cell storage backed by an ordered map behind a lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    cells: RwLock<BTreeMap<CellKey, Cell>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cells across all sheets
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<CellKey, Cell>> {
        // Every mutation is a single map operation, so a poisoned map is still consistent
        self.cells.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<CellKey, Cell>> {
        self.cells.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FromIterator<Cell> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let cells = iter.into_iter().map(|cell| (cell.key(), cell)).collect();
        Self {
            cells: RwLock::new(cells),
        }
    }
}

impl CellStore for MemoryStore {
    fn get(&self, sheet: &str, cell: &str) -> Result<Cell> {
        self.read()
            .get(&CellKey::new(sheet, cell))
            .cloned()
            .ok_or_else(|| Error::not_found(sheet, cell))
    }

    fn list(&self, sheet: &str) -> Result<Vec<Cell>> {
        Ok(self
            .read()
            .iter()
            .filter(|(key, _)| key.sheet == sheet)
            .map(|(_, cell)| cell.clone())
            .collect())
    }

    fn insert(&self, cell: Cell) -> Result<()> {
        cell.validate()?;
        let mut cells = self.write();
        let key = cell.key();
        if cells.contains_key(&key) {
            return Err(Error::AlreadyExists {
                sheet: key.sheet,
                cell: key.cell,
            });
        }
        cells.insert(key, cell);
        Ok(())
    }

    fn update(&self, cell: Cell) -> Result<()> {
        cell.validate()?;
        let mut cells = self.write();
        match cells.get_mut(&cell.key()) {
            Some(stored) => {
                *stored = cell;
                Ok(())
            }
            None => Err(Error::not_found(&cell.sheet_id, &cell.cell_id)),
        }
    }
}
