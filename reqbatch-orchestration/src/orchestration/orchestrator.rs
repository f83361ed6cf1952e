//! # Requisition Orchestrator
//!
//! Runs one submission pass over the configured sheet:
//!
//! ```text
//! ReadPending ─▶ Classify ─▶ for each bucket (name order)
//!                              for each batch (bucket's batch size)
//!                                Submit ─▶ Fallback? ─▶ Persist
//!                           ─▶ Done(RunSummary)
//! ```
//!
//! Everything is strictly sequential; one batch is in flight at a time. There
//! is no resume state: a rerun reads the sheet again and only records whose
//! status is still pending are submitted.

use std::collections::BTreeMap;

use reqbatch_shared::config::{ReqbatchConfig, StoreConfig};
use reqbatch_shared::errors::{OrchestrationError, OrchestrationResult, StoreError};
use reqbatch_shared::models::{needs_submission, Outcome, OutcomeKind, PendingRecord};
use reqbatch_shared::resilience::RetryPolicy;
use reqbatch_shared::store::RecordStore;
use reqbatch_shared::terminal::TransactionTerminal;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::lifecycle::{BatchExecutor, FallbackController, ReconciliationWriter};
use super::run_context::RunContext;
use super::status_interpreter::StatusInterpreter;
use super::value_classifier::ValueClassifier;

/// Pending records of one sheet and where their status is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSet {
    pub sheet: String,
    /// 1-based; may be a synthetic column past the last header
    pub status_column: usize,
    /// Non-blank data rows in the sheet
    pub rows_read: usize,
    pub records: Vec<PendingRecord>,
}

/// Read the configured sheet and keep the rows that still need submission.
///
/// A missing sheet, a sheet without data rows or a sheet lacking the material
/// or unit price column is a configuration failure.
pub async fn read_pending<S: RecordStore + ?Sized>(
    store: &S,
    config: &StoreConfig,
    reprocess_marker: &str,
) -> OrchestrationResult<PendingSet> {
    let sheet = config.sheet_name.as_str();
    let rows = store.list_rows(sheet).await.map_err(|error| match error {
        StoreError::SheetNotFound { sheet } => {
            OrchestrationError::ConfigurationFailure(format!("sheet '{sheet}' not found"))
        }
        other => OrchestrationError::Store(other),
    })?;

    if rows.is_empty() {
        return Err(OrchestrationError::ConfigurationFailure(format!(
            "sheet '{sheet}' has no data rows"
        )));
    }

    let required = |name: &str| {
        rows.column_index(name).ok_or_else(|| {
            OrchestrationError::ConfigurationFailure(format!(
                "sheet '{sheet}' has no '{name}' column"
            ))
        })
    };
    let material = required(config.material_column.as_str())?;
    let unit_price = required(config.unit_price_column.as_str())?;
    let quantity = rows.column_index(&config.quantity_column);
    let status = rows.column_index(&config.status_column);
    let status_column = rows.status_column(&config.status_column);

    let mut rows_read = 0;
    let mut records = Vec::new();
    for (row, cells) in rows.numbered_rows() {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows_read += 1;

        let cell = |index: Option<usize>| {
            index
                .and_then(|i| cells.get(i))
                .map(|text| text.trim().to_string())
                .unwrap_or_default()
        };
        let current_status = cell(status);
        if !needs_submission(&current_status, reprocess_marker) {
            continue;
        }
        records.push(
            PendingRecord::new(row, cell(Some(material)), cell(quantity), cell(Some(unit_price)))
                .with_status(current_status),
        );
    }

    debug!(
        sheet = sheet,
        rows_read = rows_read,
        pending = records.len(),
        status_column = status_column,
        "Read pending records"
    );

    Ok(PendingSet {
        sheet: sheet.to_string(),
        status_column,
        rows_read,
        records,
    })
}

/// One batch of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBatch {
    pub bucket: String,
    /// 1-based position within the bucket
    pub index: usize,
    pub records: Vec<PendingRecord>,
}

/// Batches in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    pub batches: Vec<PlannedBatch>,
}

impl BatchPlan {
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.batches.iter().map(|b| b.records.len()).sum()
    }

    /// Bucket names in submission order
    pub fn buckets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for batch in &self.batches {
            if names.last() != Some(&batch.bucket.as_str()) {
                names.push(&batch.bucket);
            }
        }
        names
    }

    pub fn batches_in(&self, bucket: &str) -> usize {
        self.batches.iter().filter(|b| b.bucket == bucket).count()
    }
}

/// Group records by bucket and slice each bucket into consecutive batches of
/// its batch size. Buckets come out in ascending name order and records keep
/// their sheet order.
pub fn build_plan(classifier: &ValueClassifier, records: Vec<PendingRecord>) -> BatchPlan {
    let mut buckets: BTreeMap<String, (usize, Vec<PendingRecord>)> = BTreeMap::new();
    for record in records {
        let bucket = classifier.classify_record(&record);
        buckets
            .entry(bucket.name.clone())
            .or_insert_with(|| (bucket.batch_size, Vec::new()))
            .1
            .push(record);
    }

    let batches = buckets
        .into_iter()
        .flat_map(|(name, (batch_size, records))| {
            records
                .chunks(batch_size.max(1))
                .enumerate()
                .map(|(i, chunk)| PlannedBatch {
                    bucket: name.clone(),
                    index: i + 1,
                    records: chunk.to_vec(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    BatchPlan { batches }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub correlation_id: Uuid,
    pub rows_read: usize,
    pub pending: usize,
    pub batches: usize,
    /// Terminal submissions, batch and individual
    pub submissions: usize,
    pub fallback_submissions: usize,
    pub succeeded: usize,
    pub hard_failures: usize,
    pub unknown: usize,
    pub writes_abandoned: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome.kind {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::HardFailure => self.hard_failures += 1,
            OutcomeKind::Unknown => self.unknown += 1,
        }
    }
}

/// Drives one run against a store and an exclusively held terminal
#[derive(Debug)]
pub struct RequisitionOrchestrator<'a, S, T>
where
    S: RecordStore + ?Sized,
    T: TransactionTerminal + ?Sized,
{
    config: &'a ReqbatchConfig,
    store: &'a S,
    terminal: &'a mut T,
    context: RunContext,
}

impl<'a, S, T> RequisitionOrchestrator<'a, S, T>
where
    S: RecordStore + ?Sized,
    T: TransactionTerminal + ?Sized,
{
    pub fn new(
        config: &'a ReqbatchConfig,
        store: &'a S,
        terminal: &'a mut T,
        context: RunContext,
    ) -> Self {
        Self {
            config,
            store,
            terminal,
            context,
        }
    }

    pub async fn run(self) -> OrchestrationResult<RunSummary> {
        let correlation_id = self.context.correlation_id;
        let config = self.config;
        config.validate()?;
        let classifier = ValueClassifier::new(&config.classification)?;

        info!(
            correlation_id = %correlation_id,
            requisition_group = %self.context.requisition_group,
            delivery_date = %self.context.delivery_date_text(),
            sheet = %config.store.sheet_name,
            "Starting requisition run"
        );

        let pending =
            read_pending(self.store, &config.store, &config.status.reprocess_marker).await?;
        let mut summary = RunSummary {
            correlation_id,
            rows_read: pending.rows_read,
            pending: pending.records.len(),
            ..RunSummary::default()
        };

        if pending.records.is_empty() {
            info!(
                correlation_id = %correlation_id,
                rows_read = summary.rows_read,
                "No pending records"
            );
            return Ok(summary);
        }

        let plan = build_plan(&classifier, pending.records);
        let writer = ReconciliationWriter::new(
            self.store,
            pending.sheet,
            pending.status_column,
            RetryPolicy::from(&config.store.write_retry),
            correlation_id,
        );
        let mut executor = BatchExecutor::new(
            self.terminal,
            config.submission.clone(),
            StatusInterpreter::new(&config.status),
            self.context,
        );
        let mut fallback = FallbackController::new();

        let mut current_bucket: Option<&str> = None;
        for batch in &plan.batches {
            if current_bucket != Some(batch.bucket.as_str()) {
                current_bucket = Some(batch.bucket.as_str());
                info!(
                    correlation_id = %correlation_id,
                    bucket = %batch.bucket,
                    batches = plan.batches_in(&batch.bucket),
                    "Processing bucket"
                );
            }
            info!(
                correlation_id = %correlation_id,
                bucket = %batch.bucket,
                batch_index = batch.index,
                batch_size = batch.records.len(),
                "Submitting batch"
            );

            let submission = executor.submit(&batch.records).await;
            summary.batches += 1;

            let resolved = fallback
                .resolve(&mut executor, &batch.records, submission)
                .await;
            for item in &resolved {
                summary.record(&item.outcome);
                if !writer.persist(&item.record, &item.outcome).await.is_written() {
                    summary.writes_abandoned += 1;
                }
            }
        }

        summary.submissions = executor.submissions();
        summary.fallback_submissions = fallback.resubmissions();

        info!(
            correlation_id = %correlation_id,
            pending = summary.pending,
            batches = summary.batches,
            submissions = summary.submissions,
            fallback_submissions = summary.fallback_submissions,
            succeeded = summary.succeeded,
            hard_failures = summary.hard_failures,
            unknown = summary.unknown,
            writes_abandoned = summary.writes_abandoned,
            "Requisition run complete"
        );
        Ok(summary)
    }
}
