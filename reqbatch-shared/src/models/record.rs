//! Pending requisition records.

use serde::{Deserialize, Serialize};

/// Sheet row number of the first data row (row 1 holds the headers)
pub const FIRST_DATA_ROW: usize = 2;

/// One requisition candidate read from the Record Store.
///
/// Quantity and unit price stay textual, exactly as the sheet renders them in
/// the source locale; they are normalized only when populated into the
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// 1-based sheet row, the handle used for write-back
    pub row: usize,
    pub material: String,
    pub quantity: String,
    pub unit_price: String,
    /// Status at read time, possibly empty
    pub status: String,
}

impl PendingRecord {
    pub fn new(
        row: usize,
        material: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
    ) -> Self {
        Self {
            row,
            material: material.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            status: String::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// A row needs submission when its status is empty or carries the
/// reprocess marker (case-insensitive). Any other status means the row was
/// already handled by an earlier run.
pub fn needs_submission(status: &str, reprocess_marker: &str) -> bool {
    let status = status.trim();
    if status.is_empty() {
        return true;
    }
    let marker = reprocess_marker.trim();
    !marker.is_empty() && status.to_uppercase().contains(&marker.to_uppercase())
}
