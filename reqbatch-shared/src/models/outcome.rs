//! Submission outcomes.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Classification of one submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    #[display("success")]
    Success,
    /// Error-severity status or a terminal fault
    #[display("hard_failure")]
    HardFailure,
    /// No known success or error marker in the status text
    #[display("unknown")]
    Unknown,
}

/// Result of one submission attempt, applied to every record it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Text written back to the record's status cell
    pub canonical_text: String,
    /// Number of records in the originating batch
    pub batch_size: usize,
}

impl Outcome {
    pub fn success(canonical_text: impl Into<String>, batch_size: usize) -> Self {
        Self {
            kind: OutcomeKind::Success,
            canonical_text: canonical_text.into(),
            batch_size,
        }
    }

    pub fn hard_failure(canonical_text: impl Into<String>, batch_size: usize) -> Self {
        Self {
            kind: OutcomeKind::HardFailure,
            canonical_text: canonical_text.into(),
            batch_size,
        }
    }

    pub fn unknown(canonical_text: impl Into<String>, batch_size: usize) -> Self {
        Self {
            kind: OutcomeKind::Unknown,
            canonical_text: canonical_text.into(),
            batch_size,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}
