//! # Reconciliation Writer
//!
//! Writes each record's canonical outcome text to its status cell. Transient
//! store faults are retried under a bounded [`RetryPolicy`]; a write that
//! still fails is abandoned with a warning and never ends the run.

use reqbatch_shared::errors::StoreError;
use reqbatch_shared::models::{Outcome, PendingRecord};
use reqbatch_shared::resilience::RetryPolicy;
use reqbatch_shared::store::RecordStore;
use tracing::{debug, warn};
use uuid::Uuid;

/// What happened to one status write
#[derive(Debug)]
pub enum PersistReport {
    Written { attempts: u32 },
    Abandoned { attempts: u32, error: StoreError },
}

impl PersistReport {
    pub fn is_written(&self) -> bool {
        matches!(self, PersistReport::Written { .. })
    }
}

#[derive(Debug)]
pub struct ReconciliationWriter<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    sheet: String,
    status_column: usize,
    retry: RetryPolicy,
    correlation_id: Uuid,
}

impl<'s, S: RecordStore + ?Sized> ReconciliationWriter<'s, S> {
    /// `status_column` is the 1-based column resolved from the sheet headers
    pub fn new(
        store: &'s S,
        sheet: impl Into<String>,
        status_column: usize,
        retry: RetryPolicy,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            store,
            sheet: sheet.into(),
            status_column,
            retry,
            correlation_id,
        }
    }

    pub fn status_column(&self) -> usize {
        self.status_column
    }

    pub async fn persist(&self, record: &PendingRecord, outcome: &Outcome) -> PersistReport {
        let outcome_text = outcome.canonical_text.as_str();
        let retried = self
            .retry
            .execute(
                |_| {
                    self.store
                        .write_cell(&self.sheet, record.row, self.status_column, outcome_text)
                },
                StoreError::is_transient,
            )
            .await;

        match retried.result {
            Ok(()) => {
                debug!(
                    correlation_id = %self.correlation_id,
                    row = record.row,
                    attempts = retried.attempts,
                    outcome = %outcome.kind,
                    "Status written"
                );
                PersistReport::Written {
                    attempts: retried.attempts,
                }
            }
            Err(error) => {
                warn!(
                    correlation_id = %self.correlation_id,
                    row = record.row,
                    attempts = retried.attempts,
                    error = %error,
                    status = %outcome_text,
                    "Abandoning status write"
                );
                PersistReport::Abandoned {
                    attempts: retried.attempts,
                    error,
                }
            }
        }
    }
}
