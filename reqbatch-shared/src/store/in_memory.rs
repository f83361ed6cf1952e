//! In-memory record store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{RecordStore, SheetRows};
use crate::errors::{StoreError, StoreResult};
use crate::models::FIRST_DATA_ROW;

/// A successful cell write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub sheet: String,
    pub row: usize,
    pub column: usize,
    pub text: String,
}

/// Sheets held in memory; writes update the sheet and are logged
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    sheets: Mutex<HashMap<String, SheetRows>>,
    writes: Mutex<Vec<CellWrite>>,
    transient_write_faults: AtomicU32,
    reject_writes: AtomicBool,
    write_attempts: AtomicU32,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet from a header row and data rows
    pub fn with_sheet<H, R, C>(self, name: &str, headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let sheet = SheetRows::new(
            headers.into_iter().map(Into::into).collect(),
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        );
        locked(&self.sheets).insert(name.to_string(), sheet);
        self
    }

    /// The next `count` writes fail with a transient error
    pub fn fail_next_writes(&self, count: u32) {
        self.transient_write_faults
            .fetch_add(count, Ordering::SeqCst);
    }

    /// Every write fails with a non-transient rejection
    pub fn reject_all_writes(&self) {
        self.reject_writes.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<CellWrite> {
        locked(&self.writes).clone()
    }

    /// Write calls including failed ones
    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Current text of a 1-based cell, `None` when the sheet does not exist
    pub fn cell(&self, sheet: &str, row: usize, column: usize) -> Option<String> {
        let sheets = locked(&self.sheets);
        let rows = sheets.get(sheet)?;
        let column = column.checked_sub(1)?;
        let text = if row < FIRST_DATA_ROW {
            rows.headers.get(column).cloned().unwrap_or_default()
        } else {
            rows.cell(row - FIRST_DATA_ROW, column).to_string()
        };
        Some(text)
    }
}

fn put(cells: &mut Vec<String>, column: usize, text: &str) {
    if cells.len() < column {
        cells.resize(column, String::new());
    }
    cells[column - 1] = text.to_string();
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_rows(&self, sheet: &str) -> StoreResult<SheetRows> {
        locked(&self.sheets)
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::sheet_not_found(sheet))
    }

    async fn write_cell(
        &self,
        sheet: &str,
        row: usize,
        column: usize,
        text: &str,
    ) -> StoreResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);

        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 400,
                message: "write rejected".to_string(),
            });
        }
        let pending_faults = self.transient_write_faults.load(Ordering::SeqCst);
        if pending_faults > 0 {
            self.transient_write_faults
                .store(pending_faults - 1, Ordering::SeqCst);
            return Err(StoreError::Transient("quota exceeded".to_string()));
        }
        if row == 0 || column == 0 {
            return Err(StoreError::Rejected {
                status: 400,
                message: format!("invalid cell {row}:{column}"),
            });
        }

        let mut sheets = locked(&self.sheets);
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::sheet_not_found(sheet))?;
        if row < FIRST_DATA_ROW {
            put(&mut rows.headers, column, text);
        } else {
            let index = row - FIRST_DATA_ROW;
            if rows.rows.len() <= index {
                rows.rows.resize(index + 1, Vec::new());
            }
            put(&mut rows.rows[index], column, text);
        }
        drop(sheets);

        locked(&self.writes).push(CellWrite {
            sheet: sheet.to_string(),
            row,
            column,
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryRecordStore {
        InMemoryRecordStore::new().with_sheet(
            "Requisitions",
            ["Material", "Qtd", "Preço"],
            [vec!["MAT-1", "1", "500"]],
        )
    }

    #[tokio::test]
    async fn test_write_extends_short_row() {
        let store = store();
        store
            .write_cell("Requisitions", 2, 4, "4500012345")
            .await
            .unwrap();

        assert_eq!(
            store.cell("Requisitions", 2, 4).as_deref(),
            Some("4500012345")
        );
        let rows = store.list_rows("Requisitions").await.unwrap();
        assert_eq!(rows.rows[0].len(), 4);
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_sheet() {
        let error = store().list_rows("Other").await.unwrap_err();
        assert!(matches!(error, StoreError::SheetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_injected_transient_faults() {
        let store = store();
        store.fail_next_writes(1);

        let first = store.write_cell("Requisitions", 2, 4, "x").await;
        assert!(first.unwrap_err().is_transient());
        store.write_cell("Requisitions", 2, 4, "x").await.unwrap();
        assert_eq!(store.write_attempts(), 2);
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_writes_are_not_transient() {
        let store = store();
        store.reject_all_writes();
        let error = store.write_cell("Requisitions", 2, 4, "x").await.unwrap_err();
        assert!(!error.is_transient());
        assert!(store.writes().is_empty());
    }
}
