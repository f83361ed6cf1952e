//! # Transaction Terminal
//!
//! The capability the batch executor drives to create requisitions. The host
//! is a UI-scripting session: every call is a command against a single
//! exclusive session, so all methods take `&mut self` and the orchestrator
//! holds the only mutable borrow for the whole run.
//!
//! ```text
//! TransactionTerminal
//!   ├── BridgeTerminal     <- scripting host bridge process (JSON lines over stdio)
//!   └── ScriptedTerminal   <- in-memory fake (feature `test-utils`)
//! ```
//!
//! Host-specific field codes are confined to the adapters; callers address
//! fields through [`FieldKey`].

pub mod bridge;
#[cfg(any(test, feature = "test-utils"))]
pub mod scripted;

pub use bridge::BridgeTerminal;
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::{ScriptedTerminal, TerminalStep, TransactionLog};

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::errors::TerminalResult;

/// Requisition line fields populated per record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    #[display("account_assignment")]
    AccountAssignment,
    #[display("site")]
    Site,
    #[display("material")]
    Material,
    #[display("quantity")]
    Quantity,
    #[display("unit_price")]
    UnitPrice,
    /// `dd.mm.yyyy`
    #[display("delivery_date")]
    DeliveryDate,
    #[display("requisition_group")]
    RequisitionGroup,
    #[display("currency")]
    Currency,
}

/// Severity of the message currently shown in the host status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[display("error")]
    Error,
    #[display("success")]
    Success,
    #[display("other")]
    Other,
}

/// Snapshot of the host status bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBar {
    pub severity: Severity,
    pub text: String,
}

impl StatusBar {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// One exclusive session against the transactional host
#[async_trait]
pub trait TransactionTerminal: Send + std::fmt::Debug {
    /// Start a fresh instance of the given transaction, discarding any open one
    async fn open_transaction(&mut self, code: &str) -> TerminalResult<()>;

    /// Populate one field of the requisition line at `row` (0-based)
    async fn set_field(&mut self, row: usize, field: FieldKey, value: &str) -> TerminalResult<()>;

    /// Ask the host to check the document without saving it
    async fn request_validate(&mut self) -> TerminalResult<()>;

    /// Ask the host to save the document
    async fn request_commit(&mut self) -> TerminalResult<()>;

    async fn read_status_bar(&mut self) -> TerminalResult<StatusBar>;

    /// Acknowledge a transient dialog if one is showing.
    ///
    /// Returns `true` when a dialog was present and dismissed.
    async fn dismiss_dialog(&mut self) -> TerminalResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bar() {
        let bar = StatusBar::new(Severity::Error, "Material does not exist");
        assert!(bar.is_error());
        assert!(!StatusBar::new(Severity::Success, "saved").is_error());
    }

    #[test]
    fn test_field_key_display() {
        assert_eq!(FieldKey::UnitPrice.to_string(), "unit_price");
        assert_eq!(FieldKey::DeliveryDate.to_string(), "delivery_date");
    }

    /// Compile-time proof that TransactionTerminal is object-safe
    fn _assert_object_safe(_: &dyn TransactionTerminal) {}
}
