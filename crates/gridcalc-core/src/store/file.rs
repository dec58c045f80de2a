//! JSON file cell storage
//!
//! The whole store is one document of the shape
//! `{"<sheet>": {"<cell>": {"value": "...", "result": "..."}}}`, read on open
//! and rewritten after every insert or update.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::CellStore;
use crate::cell::Cell;
use crate::error::{Error, Result};

type Document = BTreeMap<String, BTreeMap<String, Cell>>;

/// Cell storage persisted as a JSON document
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<Document>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Document::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Document::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), sheets = document.len(), "opened cell store");

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Apply `change` to the document and persist it.
    ///
    /// The in-memory document is only replaced once the file has been written.
    fn modify<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Document) -> Result<()>,
    {
        let mut document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = document.clone();
        change(&mut next)?;

        let bytes = serde_json::to_vec_pretty(&next)?;
        fs::write(&self.path, bytes)?;
        tracing::debug!(path = %self.path.display(), "saved cell store");

        *document = next;
        Ok(())
    }
}

impl CellStore for JsonFileStore {
    fn get(&self, sheet: &str, cell: &str) -> Result<Cell> {
        let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        document
            .get(sheet)
            .and_then(|cells| cells.get(cell))
            .map(|stored| Cell {
                sheet_id: sheet.to_string(),
                cell_id: cell.to_string(),
                ..stored.clone()
            })
            .ok_or_else(|| Error::not_found(sheet, cell))
    }

    fn list(&self, sheet: &str) -> Result<Vec<Cell>> {
        let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(document
            .get(sheet)
            .map(|cells| {
                cells
                    .iter()
                    .map(|(cell_id, stored)| Cell {
                        sheet_id: sheet.to_string(),
                        cell_id: cell_id.clone(),
                        ..stored.clone()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn insert(&self, cell: Cell) -> Result<()> {
        cell.validate()?;
        self.modify(|document| {
            let cells = document.entry(cell.sheet_id.clone()).or_default();
            if cells.contains_key(&cell.cell_id) {
                return Err(Error::AlreadyExists {
                    sheet: cell.sheet_id,
                    cell: cell.cell_id,
                });
            }
            cells.insert(cell.cell_id.clone(), cell);
            Ok(())
        })
    }

    fn update(&self, cell: Cell) -> Result<()> {
        cell.validate()?;
        self.modify(|document| {
            match document
                .get_mut(&cell.sheet_id)
                .and_then(|cells| cells.get_mut(&cell.cell_id))
            {
                Some(stored) => {
                    *stored = cell;
                    Ok(())
                }
                None => Err(Error::not_found(&cell.sheet_id, &cell.cell_id)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("cells.json")).unwrap();
        assert!(store.list("s").unwrap().is_empty());
        assert!(store.get("s", "a").unwrap_err().is_not_found());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cells.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.insert(Cell::new("s", "a", "1").with_result("1")).unwrap();
            store.insert(Cell::new("s", "b", "a+1").with_result("2")).unwrap();
            store.update(Cell::new("s", "a", "5").with_result("5")).unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("s", "a").unwrap(), Cell::new("s", "a", "5").with_result("5"));
        let ids: Vec<_> = store.list("s").unwrap().into_iter().map(|c| c.cell_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cells.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.insert(Cell::new("s", "a", "2+2").with_result("4")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "s": { "a": { "value": "2+2", "result": "4" } } })
        );
    }

    #[test]
    fn test_failed_change_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cells.json");
        let store = JsonFileStore::open(&path).unwrap();

        assert!(store.update(Cell::new("s", "a", "1")).unwrap_err().is_not_found());
        assert!(!path.exists());

        store.insert(Cell::new("s", "a", "1")).unwrap();
        assert!(matches!(
            store.insert(Cell::new("s", "a", "2")),
            Err(Error::AlreadyExists { .. })
        ));
        assert_eq!(store.get("s", "a").unwrap().value, "1");
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cells.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(Error::Json(_))));
    }
}
