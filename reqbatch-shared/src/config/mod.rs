//! # Configuration
//!
//! Immutable run configuration, constructed once at process start and passed
//! explicitly to every component.
//!
//! ## Structure
//!
//! ```text
//! ReqbatchConfig
//! ├── submission      # transaction code, site, currency, delivery lookahead, dialog handling
//! ├── classification  # bucket table and classification basis
//! ├── status          # success markers, reprocess marker
//! ├── store           # spreadsheet, sheet/column names, write retry policy
//! └── terminal        # scripting host bridge command
//! ```
//!
//! ## Example
//!
//! ```toml
//! [submission]
//! site_code = "BR8E"
//! delivery_lookahead_days = 120
//!
//! [store]
//! spreadsheet_id = "1AbC..."
//! sheet_name = "Requisitions"
//!
//! [store.write_retry]
//! max_attempts = 2
//! interval_ms = 1000
//! ```

pub mod buckets;
pub mod loader;

pub use buckets::{default_buckets, BucketConfig, ClassificationBasis, ClassificationConfig};
pub use loader::{load_config, ConfigLoader, CONFIG_FILE_STEM, ENV_PREFIX};

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level reqbatch configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReqbatchConfig {
    pub submission: SubmissionConfig,
    pub classification: ClassificationConfig,
    pub status: StatusConfig,
    pub store: StoreConfig,
    pub terminal: TerminalConfig,
}

impl ReqbatchConfig {
    /// Check cross-field invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classification.validate()?;

        if self.submission.transaction_code.trim().is_empty() {
            return Err(ConfigError::invalid("submission.transaction_code is empty"));
        }
        if self.submission.site_code.trim().is_empty() {
            return Err(ConfigError::invalid("submission.site_code is empty"));
        }
        if self.store.sheet_name.trim().is_empty() {
            return Err(ConfigError::invalid("store.sheet_name is empty"));
        }
        if self.store.write_retry.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "store.write_retry.max_attempts must be at least 1",
            ));
        }
        if self.terminal.response_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "terminal.response_timeout_ms must be positive",
            ));
        }
        if self.status.success_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::invalid("status.success_markers is empty"));
        }
        Ok(())
    }
}

/// Fixed values populated into every requisition line
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Transaction opened for each batch
    pub transaction_code: String,
    /// Default plant/site code
    pub site_code: String,
    pub currency_code: String,
    /// Delivery date is today plus this many days
    pub delivery_lookahead_days: u32,
    /// Account-assignment category, populated only when set
    pub account_assignment: Option<String>,
    /// Wait after each terminal command for the host UI to settle
    pub settle_delay_ms: u64,
    /// Upper bound on consecutive dialog dismissals after a command
    pub max_dialog_dismissals: u32,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            transaction_code: "ME51N".to_string(),
            site_code: "BR8E".to_string(),
            currency_code: "USD".to_string(),
            delivery_lookahead_days: 120,
            account_assignment: None,
            settle_delay_ms: 500,
            max_dialog_dismissals: 3,
        }
    }
}

impl SubmissionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Status text heuristics
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Case-insensitive substrings meaning "created/saved/recorded"
    pub success_markers: Vec<String>,
    /// Statuses containing this marker are submitted again
    pub reprocess_marker: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            success_markers: [
                "created",
                "saved",
                "recorded",
                "criad",
                "gravad",
                "registrad",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            reprocess_marker: "NAO".to_string(),
        }
    }
}

/// Record Store location and write discipline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub spreadsheet_id: String,
    /// Service-account key file
    pub credentials_file: PathBuf,
    pub api_base_url: String,
    pub sheet_name: String,
    pub material_column: String,
    pub quantity_column: String,
    pub unit_price_column: String,
    pub status_column: String,
    pub request_timeout_ms: u64,
    pub write_retry: RetryConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            credentials_file: PathBuf::from("credentials.json"),
            api_base_url: "https://sheets.googleapis.com".to_string(),
            sheet_name: "Requisitions".to_string(),
            material_column: "Material".to_string(),
            quantity_column: "Qtd".to_string(),
            unit_price_column: "Preço".to_string(),
            status_column: "Status".to_string(),
            request_timeout_ms: 30_000,
            write_retry: RetryConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Bounded retry settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            interval_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Scripting host bridge process
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Longest wait for one bridge reply before the session is given up
    pub response_timeout_ms: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            program: "sap-scripting-bridge".to_string(),
            args: Vec::new(),
            response_timeout_ms: 60_000,
        }
    }
}

impl TerminalConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
