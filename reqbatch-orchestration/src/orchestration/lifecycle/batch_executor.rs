//! # Batch Executor
//!
//! Drives one batch through the terminal: open a fresh transaction, populate
//! one line per record, validate, commit and interpret the status bar. The
//! returned outcome applies to the whole batch.
//!
//! Terminal faults never escape: a record whose fields cannot be populated is
//! reported as a [`FillFault`] and skipped, and any other fault turns the
//! batch outcome into a hard failure carrying the fault text.
//!
//! Host dialogs are dismissed after every command, field writes included, so
//! a dialog raised by one field cannot block the next one.

use reqbatch_shared::config::SubmissionConfig;
use reqbatch_shared::errors::{TerminalError, TerminalResult};
use reqbatch_shared::formatting::format_locale_decimal;
use reqbatch_shared::models::{Outcome, OutcomeKind, PendingRecord};
use reqbatch_shared::terminal::{FieldKey, TransactionTerminal};
use tracing::{debug, warn};

use crate::orchestration::run_context::RunContext;
use crate::orchestration::status_interpreter::StatusInterpreter;

/// Text recorded when no record of a batch could be populated
pub const NOTHING_POPULATED: &str = "No record of the batch could be populated";

/// A record whose fields could not be populated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillFault {
    /// Sheet row of the record
    pub row: usize,
    pub message: String,
}

/// Why a record could not be populated
#[derive(Debug)]
enum FillError {
    /// The host refused one of the record's fields
    Field(TerminalError),
    /// The session itself faulted or stopped replying
    Session(TerminalError),
}

impl FillError {
    fn from_write(fault: TerminalError) -> Self {
        match fault {
            TerminalError::Timeout(_) | TerminalError::Closed => Self::Session(fault),
            other => Self::Field(other),
        }
    }
}

/// Result of one batch submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSubmission {
    pub outcome: Outcome,
    /// Records left out of the submitted document
    pub fill_faults: Vec<FillFault>,
}

impl BatchSubmission {
    pub fn fill_fault_for(&self, row: usize) -> Option<&FillFault> {
        self.fill_faults.iter().find(|fault| fault.row == row)
    }
}

/// Submits batches through an exclusively borrowed terminal
#[derive(Debug)]
pub struct BatchExecutor<'t, T: TransactionTerminal + ?Sized> {
    terminal: &'t mut T,
    settings: SubmissionConfig,
    interpreter: StatusInterpreter,
    context: RunContext,
    submissions: usize,
}

impl<'t, T: TransactionTerminal + ?Sized> BatchExecutor<'t, T> {
    pub fn new(
        terminal: &'t mut T,
        settings: SubmissionConfig,
        interpreter: StatusInterpreter,
        context: RunContext,
    ) -> Self {
        Self {
            terminal,
            settings,
            interpreter,
            context,
            submissions: 0,
        }
    }

    /// Number of submissions made so far, including per-record resubmissions
    pub fn submissions(&self) -> usize {
        self.submissions
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Submit `batch` as one document
    pub async fn submit(&mut self, batch: &[PendingRecord]) -> BatchSubmission {
        self.submissions += 1;
        let mut fill_faults = Vec::new();

        let outcome = match self.drive(batch, &mut fill_faults).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(
                    correlation_id = %self.context.correlation_id,
                    batch_size = batch.len(),
                    error = %fault,
                    "Terminal fault during submission"
                );
                Outcome::hard_failure(fault.to_string(), batch.len())
            }
        };

        BatchSubmission {
            outcome,
            fill_faults,
        }
    }

    async fn drive(
        &mut self,
        batch: &[PendingRecord],
        fill_faults: &mut Vec<FillFault>,
    ) -> TerminalResult<Outcome> {
        let size = batch.len();
        let correlation_id = self.context.correlation_id;

        self.terminal
            .open_transaction(&self.settings.transaction_code)
            .await?;
        self.settle().await?;

        let mut populated = 0;
        for record in batch {
            match self.populate(populated, record).await {
                Ok(()) => populated += 1,
                Err(FillError::Session(fault)) => return Err(fault),
                Err(FillError::Field(fault)) => {
                    warn!(
                        correlation_id = %correlation_id,
                        row = record.row,
                        material = %record.material,
                        error = %fault,
                        "Could not populate record"
                    );
                    fill_faults.push(FillFault {
                        row: record.row,
                        message: fault.to_string(),
                    });
                }
            }
        }

        if populated == 0 {
            warn!(
                correlation_id = %correlation_id,
                batch_size = size,
                "No record populated, skipping validation"
            );
            return Ok(Outcome::unknown(NOTHING_POPULATED, size));
        }

        self.terminal.request_validate().await?;
        self.settle().await?;
        let validation = self.terminal.read_status_bar().await?;
        if validation.is_error() {
            warn!(
                correlation_id = %correlation_id,
                batch_size = size,
                status = %validation.text,
                "Validation rejected batch"
            );
            return Ok(Outcome::hard_failure(validation.text, size));
        }

        self.terminal.request_commit().await?;
        self.settle().await?;
        let status = self.terminal.read_status_bar().await?;
        let outcome = self.interpreter.interpret(status.severity, &status.text, size);

        match outcome.kind {
            OutcomeKind::Unknown => warn!(
                correlation_id = %correlation_id,
                batch_size = size,
                status = %status.text,
                "Ambiguous status"
            ),
            OutcomeKind::HardFailure => warn!(
                correlation_id = %correlation_id,
                batch_size = size,
                status = %status.text,
                "Commit rejected batch"
            ),
            OutcomeKind::Success => debug!(
                correlation_id = %correlation_id,
                batch_size = size,
                document = %outcome.canonical_text,
                "Batch committed"
            ),
        }
        Ok(outcome)
    }

    /// Fill one requisition line
    async fn populate(&mut self, line: usize, record: &PendingRecord) -> Result<(), FillError> {
        let mut fields = Vec::with_capacity(8);
        if let Some(category) = &self.settings.account_assignment {
            fields.push((FieldKey::AccountAssignment, category.clone()));
        }
        fields.extend([
            (FieldKey::Site, self.settings.site_code.clone()),
            (FieldKey::Material, record.material.trim().to_string()),
            (FieldKey::Quantity, format_locale_decimal(&record.quantity)),
            (FieldKey::UnitPrice, format_locale_decimal(&record.unit_price)),
            (FieldKey::DeliveryDate, self.context.delivery_date_text()),
            (
                FieldKey::RequisitionGroup,
                self.context.requisition_group.code.to_string(),
            ),
            (FieldKey::Currency, self.settings.currency_code.clone()),
        ]);

        for (field, value) in fields {
            self.terminal
                .set_field(line, field, &value)
                .await
                .map_err(FillError::from_write)?;
            self.dismiss_dialogs().await.map_err(FillError::Session)?;
        }
        Ok(())
    }

    /// Dismiss up to `max_dialog_dismissals` dialogs
    async fn dismiss_dialogs(&mut self) -> TerminalResult<()> {
        for _ in 0..self.settings.max_dialog_dismissals {
            if !self.terminal.dismiss_dialog().await? {
                break;
            }
        }
        Ok(())
    }

    /// Dismiss transient dialogs, then give the host time to settle
    async fn settle(&mut self) -> TerminalResult<()> {
        self.dismiss_dialogs().await?;
        let delay = self.settings.settle_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reqbatch_shared::models::REQUISITION_GROUPS;
    use reqbatch_shared::terminal::{ScriptedTerminal, Severity, TerminalStep};

    fn settings() -> SubmissionConfig {
        SubmissionConfig {
            settle_delay_ms: 0,
            ..SubmissionConfig::default()
        }
    }

    fn context() -> RunContext {
        RunContext::new(
            REQUISITION_GROUPS[3],
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        )
    }

    fn records(materials: &[&str]) -> Vec<PendingRecord> {
        materials
            .iter()
            .enumerate()
            .map(|(i, m)| PendingRecord::new(i + 2, *m, "1.000", "1.234,56"))
            .collect()
    }

    #[tokio::test]
    async fn test_successful_batch_populates_every_field() {
        let mut terminal =
            ScriptedTerminal::new().with_commit_text("Requisition 4500012345 created");
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1", "MAT-2"])).await;
        assert_eq!(submission.outcome, Outcome::success("4500012345", 2));
        assert!(submission.fill_faults.is_empty());
        assert_eq!(executor.submissions(), 1);

        let fields = terminal.fields();
        assert_eq!(fields.len(), 14);
        assert!(fields.contains(&(1, FieldKey::Material, "MAT-2".to_string())));
        assert!(fields.contains(&(0, FieldKey::Quantity, "1000,00".to_string())));
        assert!(fields.contains(&(0, FieldKey::UnitPrice, "1234,56".to_string())));
        assert!(fields.contains(&(0, FieldKey::DeliveryDate, "15.03.2025".to_string())));
        assert!(fields.contains(&(0, FieldKey::RequisitionGroup, "P04".to_string())));
        assert!(fields.contains(&(0, FieldKey::Site, "BR8E".to_string())));
        assert!(fields.contains(&(0, FieldKey::Currency, "USD".to_string())));
        assert!(!fields.iter().any(|(_, f, _)| *f == FieldKey::AccountAssignment));
    }

    #[tokio::test]
    async fn test_account_assignment_when_configured() {
        let mut terminal = ScriptedTerminal::new();
        let settings = SubmissionConfig {
            account_assignment: Some("P".to_string()),
            ..settings()
        };
        let mut executor =
            BatchExecutor::new(&mut terminal, settings, StatusInterpreter::default(), context());
        executor.submit(&records(&["MAT-1"])).await;

        assert_eq!(
            terminal.fields()[0],
            (0, FieldKey::AccountAssignment, "P".to_string())
        );
    }

    #[tokio::test]
    async fn test_validation_error_aborts_before_commit() {
        let mut terminal =
            ScriptedTerminal::new().with_validation_error("MAT-2", "Material MAT-2 not found");
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1", "MAT-2"])).await;
        assert_eq!(
            submission.outcome,
            Outcome::hard_failure("Material MAT-2 not found", 2)
        );
        assert_eq!(terminal.commits(), 0);
    }

    #[tokio::test]
    async fn test_fill_fault_is_reported_and_skipped() {
        let mut terminal = ScriptedTerminal::new().with_fill_fault("BAD");
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1", "BAD", "MAT-3"])).await;
        assert!(submission.outcome.is_success());
        assert_eq!(submission.fill_faults.len(), 1);
        assert_eq!(submission.fill_faults[0].row, 3);
        assert!(submission.fill_fault_for(3).is_some());
        assert!(submission.fill_fault_for(2).is_none());

        // MAT-3 takes the line BAD could not fill
        assert!(terminal
            .fields()
            .contains(&(1, FieldKey::Material, "MAT-3".to_string())));
        assert_eq!(terminal.transactions()[0].materials, vec!["MAT-1", "MAT-3"]);
    }

    #[tokio::test]
    async fn test_nothing_populated_is_unknown() {
        let mut terminal = ScriptedTerminal::new().with_fill_fault("BAD");
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["BAD"])).await;
        assert_eq!(submission.outcome.kind, OutcomeKind::Unknown);
        assert_eq!(submission.outcome.canonical_text, NOTHING_POPULATED);
        assert!(!terminal.transactions()[0].validated);
        assert_eq!(terminal.commits(), 0);
    }

    #[tokio::test]
    async fn test_terminal_fault_becomes_hard_failure() {
        let mut terminal = ScriptedTerminal::new().fail_next(TerminalStep::Commit, 1);
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1"])).await;
        assert_eq!(submission.outcome.kind, OutcomeKind::HardFailure);
        assert!(submission.outcome.canonical_text.contains("Commit"));
    }

    #[tokio::test]
    async fn test_ambiguous_status_is_unknown() {
        let mut terminal = ScriptedTerminal::new()
            .with_commit_status(Severity::Other, "Document is being processed");
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1"])).await;
        assert_eq!(
            submission.outcome,
            Outcome::unknown("Document is being processed", 1)
        );
    }

    #[tokio::test]
    async fn test_dialog_dismissal_is_bounded() {
        let mut terminal = ScriptedTerminal::new().with_sticky_dialog();
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1"])).await;
        assert!(submission.outcome.is_success());
        // open, seven field writes, validate and commit each dismiss up to
        // the configured maximum of three
        assert_eq!(terminal.dismissals(), 30);
    }

    #[tokio::test]
    async fn test_field_dialogs_are_dismissed_during_fill() {
        let mut terminal = ScriptedTerminal::new()
            .with_commit_text("Requisition 4500012345 created")
            .with_dialog_on_field(FieldKey::Material);
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1", "MAT-2", "MAT-3"])).await;
        assert_eq!(submission.outcome, Outcome::success("4500012345", 3));
        assert!(submission.fill_faults.is_empty());
        assert_eq!(
            terminal.transactions()[0].materials,
            vec!["MAT-1", "MAT-2", "MAT-3"]
        );
        assert_eq!(terminal.fields().len(), 21);
        assert_eq!(terminal.dismissals(), 3);
    }

    #[tokio::test]
    async fn test_dialogs_after_commit_are_cleared() {
        let mut terminal = ScriptedTerminal::new().with_dialogs_after_commit(2);
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        executor.submit(&records(&["MAT-1"])).await;
        assert_eq!(terminal.dismissals(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_fault_is_hard_failure() {
        let mut terminal = ScriptedTerminal::new().fail_next(TerminalStep::Dismiss, 1);
        let mut executor =
            BatchExecutor::new(&mut terminal, settings(), StatusInterpreter::default(), context());

        let submission = executor.submit(&records(&["MAT-1"])).await;
        assert_eq!(submission.outcome.kind, OutcomeKind::HardFailure);
    }
}
