//! # Fallback Controller
//!
//! Turns one batch submission into an outcome per record. A failed batch of
//! more than one record is resubmitted one record at a time, in order, to
//! isolate the records that caused the failure. Isolation goes one level
//! deep: an individual failure is final.

use reqbatch_shared::models::{Outcome, PendingRecord};
use reqbatch_shared::terminal::TransactionTerminal;
use tracing::{debug, info};

use super::batch_executor::{BatchExecutor, BatchSubmission};

/// A record and the outcome it ends the run with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub record: PendingRecord,
    pub outcome: Outcome,
    /// Resolved by an individual resubmission
    pub isolated: bool,
}

#[derive(Debug, Default)]
pub struct FallbackController {
    resubmissions: usize,
}

impl FallbackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Individual resubmissions made so far
    pub fn resubmissions(&self) -> usize {
        self.resubmissions
    }

    /// Map every record of `batch` to its final outcome, in batch order
    pub async fn resolve<T: TransactionTerminal + ?Sized>(
        &mut self,
        executor: &mut BatchExecutor<'_, T>,
        batch: &[PendingRecord],
        submission: BatchSubmission,
    ) -> Vec<ResolvedRecord> {
        if submission.outcome.is_success() {
            return batch
                .iter()
                .map(|record| {
                    let outcome = match submission.fill_fault_for(record.row) {
                        Some(fault) => Outcome::hard_failure(fault.message.clone(), batch.len()),
                        None => submission.outcome.clone(),
                    };
                    ResolvedRecord {
                        record: record.clone(),
                        outcome,
                        isolated: false,
                    }
                })
                .collect();
        }

        if batch.len() <= 1 {
            return batch
                .iter()
                .map(|record| ResolvedRecord {
                    record: record.clone(),
                    outcome: individual_outcome(&submission, record),
                    isolated: false,
                })
                .collect();
        }

        info!(
            correlation_id = %executor.context().correlation_id,
            batch_size = batch.len(),
            outcome = %submission.outcome.kind,
            "Batch failed, resubmitting records individually"
        );

        let mut resolved = Vec::with_capacity(batch.len());
        for record in batch {
            self.resubmissions += 1;
            let single = executor.submit(std::slice::from_ref(record)).await;
            debug!(
                correlation_id = %executor.context().correlation_id,
                row = record.row,
                outcome = %single.outcome.kind,
                "Individual resubmission finished"
            );
            resolved.push(ResolvedRecord {
                record: record.clone(),
                outcome: individual_outcome(&single, record),
                isolated: true,
            });
        }
        resolved
    }
}

/// Outcome of a one-record submission; a fill fault names the actual cause
fn individual_outcome(submission: &BatchSubmission, record: &PendingRecord) -> Outcome {
    match submission.fill_fault_for(record.row) {
        Some(fault) => Outcome::hard_failure(fault.message.clone(), 1),
        None => submission.outcome.clone(),
    }
}
