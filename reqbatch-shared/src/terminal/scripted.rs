//! Scripted in-memory terminal for tests.
//!
//! Responses are keyed by material: a material can be scripted to fail
//! validation, to fail on commit, or to fault while its fields are populated.
//! Every transaction is recorded so tests can assert how many submissions
//! were made and which materials each one carried.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{FieldKey, Severity, StatusBar, TransactionTerminal};
use crate::errors::{TerminalError, TerminalResult};

/// Terminal call that can be scripted to fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalStep {
    Open,
    SetField,
    Validate,
    Commit,
    ReadStatus,
    Dismiss,
}

/// One opened transaction and what happened to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionLog {
    pub code: String,
    /// Materials populated successfully, in row order
    pub materials: Vec<String>,
    pub validated: bool,
    pub committed: bool,
}

#[derive(Debug)]
pub struct ScriptedTerminal {
    validation_errors: HashMap<String, String>,
    commit_errors: HashMap<String, String>,
    fill_faults: HashSet<String>,
    commit_status: Option<StatusBar>,
    injected_faults: HashMap<TerminalStep, u32>,
    dialogs_after_commit: u32,
    sticky_dialog: bool,
    dialog_fields: HashSet<FieldKey>,
    pending_dialogs: u32,
    status: StatusBar,
    next_document: u64,
    fields: Vec<(usize, FieldKey, String)>,
    transactions: Vec<TransactionLog>,
    dismissals: u32,
}

impl Default for ScriptedTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTerminal {
    /// A terminal that accepts everything and numbers documents from 10000001
    pub fn new() -> Self {
        Self {
            validation_errors: HashMap::new(),
            commit_errors: HashMap::new(),
            fill_faults: HashSet::new(),
            commit_status: None,
            injected_faults: HashMap::new(),
            dialogs_after_commit: 0,
            sticky_dialog: false,
            dialog_fields: HashSet::new(),
            pending_dialogs: 0,
            status: StatusBar::new(Severity::Other, ""),
            next_document: 10_000_001,
            fields: Vec::new(),
            transactions: Vec::new(),
            dismissals: 0,
        }
    }

    /// Validation of any transaction carrying `material` reports `message`
    pub fn with_validation_error(
        mut self,
        material: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.validation_errors
            .insert(material.into(), message.into());
        self
    }

    /// Commit of any transaction carrying `material` reports `message` as an error
    pub fn with_commit_error(
        mut self,
        material: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.commit_errors.insert(material.into(), message.into());
        self
    }

    /// Populating the material field with `material` faults
    pub fn with_fill_fault(mut self, material: impl Into<String>) -> Self {
        self.fill_faults.insert(material.into());
        self
    }

    /// Every successful commit reports this text with success severity
    pub fn with_commit_text(self, text: impl Into<String>) -> Self {
        self.with_commit_status(Severity::Success, text)
    }

    /// Every commit without a scripted error reports this status
    pub fn with_commit_status(mut self, severity: Severity, text: impl Into<String>) -> Self {
        self.commit_status = Some(StatusBar::new(severity, text));
        self
    }

    /// Show `count` dialogs after each commit
    pub fn with_dialogs_after_commit(mut self, count: u32) -> Self {
        self.dialogs_after_commit = count;
        self
    }

    /// Writing `field` raises a modal dialog that blocks further field
    /// writes until it is dismissed
    pub fn with_dialog_on_field(mut self, field: FieldKey) -> Self {
        self.dialog_fields.insert(field);
        self
    }

    /// A dialog that reappears every time it is dismissed
    pub fn with_sticky_dialog(mut self) -> Self {
        self.sticky_dialog = true;
        self
    }

    /// Fault the next `times` calls of `step`
    pub fn fail_next(mut self, step: TerminalStep, times: u32) -> Self {
        *self.injected_faults.entry(step).or_default() += times;
        self
    }

    pub fn transactions(&self) -> &[TransactionLog] {
        &self.transactions
    }

    pub fn transactions_opened(&self) -> usize {
        self.transactions.len()
    }

    pub fn commits(&self) -> usize {
        self.transactions.iter().filter(|t| t.committed).count()
    }

    pub fn dismissals(&self) -> u32 {
        self.dismissals
    }

    /// Fields set in the current transaction as `(row, field, value)`
    pub fn fields(&self) -> &[(usize, FieldKey, String)] {
        &self.fields
    }

    fn take_fault(&mut self, step: TerminalStep) -> TerminalResult<()> {
        if let Some(remaining) = self.injected_faults.get_mut(&step) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TerminalError::fault(format!("scripted {step:?} fault")));
            }
        }
        Ok(())
    }

    fn current(&mut self) -> TerminalResult<&mut TransactionLog> {
        self.transactions
            .last_mut()
            .ok_or_else(|| TerminalError::fault("no open transaction"))
    }

    fn first_scripted(
        scripted: &HashMap<String, String>,
        materials: &[String],
    ) -> Option<String> {
        materials.iter().find_map(|m| scripted.get(m).cloned())
    }
}

#[async_trait]
impl TransactionTerminal for ScriptedTerminal {
    async fn open_transaction(&mut self, code: &str) -> TerminalResult<()> {
        self.take_fault(TerminalStep::Open)?;
        self.transactions.push(TransactionLog {
            code: code.to_string(),
            ..TransactionLog::default()
        });
        self.fields.clear();
        self.pending_dialogs = 0;
        self.status = StatusBar::new(Severity::Other, "");
        Ok(())
    }

    async fn set_field(&mut self, row: usize, field: FieldKey, value: &str) -> TerminalResult<()> {
        self.take_fault(TerminalStep::SetField)?;
        if self.pending_dialogs > 0 {
            return Err(TerminalError::fault(format!(
                "field {field} blocked by an open modal dialog"
            )));
        }
        if field == FieldKey::Material && self.fill_faults.contains(value) {
            return Err(TerminalError::fault(format!(
                "field {field} not editable for {value}"
            )));
        }
        let transaction = self.current()?;
        if field == FieldKey::Material {
            transaction.materials.push(value.to_string());
        }
        self.fields.push((row, field, value.to_string()));
        if self.dialog_fields.contains(&field) {
            self.pending_dialogs += 1;
        }
        Ok(())
    }

    async fn request_validate(&mut self) -> TerminalResult<()> {
        self.take_fault(TerminalStep::Validate)?;
        let materials = {
            let transaction = self.current()?;
            transaction.validated = true;
            transaction.materials.clone()
        };
        self.status = match Self::first_scripted(&self.validation_errors, &materials) {
            Some(message) => StatusBar::new(Severity::Error, message),
            None => StatusBar::new(Severity::Other, ""),
        };
        Ok(())
    }

    async fn request_commit(&mut self) -> TerminalResult<()> {
        self.take_fault(TerminalStep::Commit)?;
        let materials = {
            let transaction = self.current()?;
            transaction.committed = true;
            transaction.materials.clone()
        };
        self.status = match Self::first_scripted(&self.commit_errors, &materials) {
            Some(message) => StatusBar::new(Severity::Error, message),
            None => match &self.commit_status {
                Some(status) => status.clone(),
                None => {
                    let document = self.next_document;
                    self.next_document += 1;
                    StatusBar::new(
                        Severity::Success,
                        format!("Purchase requisition number {document} created"),
                    )
                }
            },
        };
        self.pending_dialogs = self.dialogs_after_commit;
        Ok(())
    }

    async fn read_status_bar(&mut self) -> TerminalResult<StatusBar> {
        self.take_fault(TerminalStep::ReadStatus)?;
        Ok(self.status.clone())
    }

    async fn dismiss_dialog(&mut self) -> TerminalResult<bool> {
        self.take_fault(TerminalStep::Dismiss)?;
        if self.sticky_dialog || self.pending_dialogs > 0 {
            self.pending_dialogs = self.pending_dialogs.saturating_sub(1);
            self.dismissals += 1;
            return Ok(true);
        }
        Ok(false)
    }
}
