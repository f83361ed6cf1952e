//! # Error Types
//!
//! One `thiserror` enum per concern. Terminal faults are downgraded to a failed
//! outcome and store write faults are retried, so only [`OrchestrationError`]
//! ends a run.

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Record Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a Record Store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("Transient store failure: {0}")]
    Transient(String),

    #[error("Store rejected request: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn sheet_not_found(sheet: impl Into<String>) -> Self {
        Self::SheetNotFound {
            sheet: sheet.into(),
        }
    }

    /// Check if the failure is worth retrying after a short wait
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transient(_) => true,
            StoreError::Http(e) => e.is_timeout() || e.is_connect(),
            StoreError::Rejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Transaction Terminal result type
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Errors raised by a Transaction Terminal adapter
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("Terminal fault: {0}")]
    Fault(String),

    #[error("Terminal protocol violation: {0}")]
    Protocol(String),

    #[error("Terminal session closed")]
    Closed,

    #[error("Terminal did not reply within {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TerminalError {
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}

/// Orchestration result type
pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Errors that end an orchestration run
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Configuration failure: {0}")]
    ConfigurationFailure(String),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ConfigError> for OrchestrationError {
    fn from(error: ConfigError) -> Self {
        Self::ConfigurationFailure(error.to_string())
    }
}
