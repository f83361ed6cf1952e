//! # Status Interpreter
//!
//! Classifies the terminal's free-text status into an [`Outcome`]:
//!
//! | condition | outcome | canonical text |
//! |---|---|---|
//! | error severity | HardFailure | raw text |
//! | success marker present, or text purely numeric | Success | last numeric token, else trimmed text |
//! | anything else | Unknown | raw text |
//!
//! Marker matching is case-insensitive substring matching, so the marker list
//! must follow the host's display language.

use std::sync::LazyLock;

use regex::Regex;
use reqbatch_shared::config::StatusConfig;
use reqbatch_shared::models::Outcome;
use reqbatch_shared::terminal::Severity;

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid numeric token pattern"));

/// Last run of digits in `text`, e.g. the document number in
/// `"Purchase requisition 4500012345 created"`
pub fn last_numeric_token(text: &str) -> Option<&str> {
    NUMERIC_TOKEN.find_iter(text).last().map(|m| m.as_str())
}

fn is_purely_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone)]
pub struct StatusInterpreter {
    /// Lower-cased, blanks removed
    success_markers: Vec<String>,
}

impl StatusInterpreter {
    pub fn new(config: &StatusConfig) -> Self {
        Self::with_markers(&config.success_markers)
    }

    pub fn with_markers<S: AsRef<str>>(markers: &[S]) -> Self {
        Self {
            success_markers: markers
                .iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn interpret(&self, severity: Severity, text: &str, batch_size: usize) -> Outcome {
        if severity == Severity::Error {
            return Outcome::hard_failure(text, batch_size);
        }

        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();
        let has_marker = self
            .success_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()));

        if has_marker || is_purely_numeric(trimmed) {
            let canonical = last_numeric_token(trimmed).unwrap_or(trimmed);
            return Outcome::success(canonical, batch_size);
        }

        Outcome::unknown(text, batch_size)
    }
}

impl Default for StatusInterpreter {
    fn default() -> Self {
        Self::new(&StatusConfig::default())
    }
}
