//! # Record Store
//!
//! Tabular persistence the orchestrator reads pending records from and writes
//! outcomes back to. Rows and columns are 1-based, matching the spreadsheet;
//! row 1 holds the headers.
//!
//! ```text
//! RecordStore
//!   ├── SheetsRecordStore     <- Google Sheets v4 values API
//!   └── InMemoryRecordStore   <- in-memory fake (feature `test-utils`)
//! ```

pub mod auth;
#[cfg(any(test, feature = "test-utils"))]
pub mod in_memory;
pub mod sheets;

pub use auth::ServiceAccountAuth;
#[cfg(any(test, feature = "test-utils"))]
pub use in_memory::{CellWrite, InMemoryRecordStore};
pub use sheets::{a1_cell, column_letters, SheetsRecordStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreResult;
use crate::models::FIRST_DATA_ROW;

/// Contents of one sheet: the header row and the data rows below it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRows {
    pub headers: Vec<String>,
    /// Data rows; `rows[0]` is sheet row 2
    pub rows: Vec<Vec<String>>,
}

impl SheetRows {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// 0-based index of the column named `name`; exact match first, then
    /// case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .or_else(|| {
                let lowered = name.to_lowercase();
                self.headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == lowered)
            })
    }

    /// 1-based status column; a synthetic trailing column when the header is absent
    pub fn status_column(&self, name: &str) -> usize {
        self.column_index(name)
            .map(|index| index + 1)
            .unwrap_or(self.headers.len() + 1)
    }

    /// Cell text at a 0-based data row and column, empty when the row is short
    pub fn cell(&self, data_row: usize, column: usize) -> &str {
        self.rows
            .get(data_row)
            .and_then(|row| row.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Data rows paired with their 1-based sheet row numbers
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i + FIRST_DATA_ROW, row.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tabular record persistence
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Read the header row and every data row of `sheet`
    async fn list_rows(&self, sheet: &str) -> StoreResult<SheetRows>;

    /// Overwrite one cell; `row` and `column` are 1-based
    async fn write_cell(&self, sheet: &str, row: usize, column: usize, text: &str)
        -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SheetRows {
        SheetRows::new(
            vec!["Material".into(), "Qtd".into(), "Preço".into(), "status".into()],
            vec![
                vec!["MAT-1".into(), "1".into(), "500".into()],
                vec!["MAT-2".into(), "2".into(), "3000".into(), "NAO".into()],
            ],
        )
    }

    #[test]
    fn test_column_lookup() {
        let rows = sheet();
        assert_eq!(rows.column_index("Material"), Some(0));
        assert_eq!(rows.column_index("PREÇO"), Some(2));
        assert_eq!(rows.column_index("Unknown"), None);
    }

    #[test]
    fn test_status_column_is_case_insensitive_or_synthetic() {
        let rows = sheet();
        assert_eq!(rows.status_column("Status"), 4);

        let without = SheetRows::new(vec!["Material".into(), "Qtd".into()], Vec::new());
        assert_eq!(without.status_column("Status"), 3);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let rows = sheet();
        assert_eq!(rows.cell(0, 3), "");
        assert_eq!(rows.cell(1, 3), "NAO");
        assert_eq!(rows.cell(9, 0), "");
    }

    #[test]
    fn test_numbered_rows_start_after_header() {
        let numbers: Vec<usize> = sheet().numbered_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    /// Compile-time proof that RecordStore is object-safe
    fn _assert_object_safe(_: &dyn RecordStore) {}
}
