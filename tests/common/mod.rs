//! Helpers shared by the end-to-end scenarios.
//!
// Using #[allow(dead_code)] instead of #[expect]: each test target uses a
// different subset of these helpers.
#![allow(dead_code)]

use chrono::NaiveDate;
use reqbatch_core::orchestration::{RequisitionOrchestrator, RunContext, RunSummary};
use reqbatch_core::shared::config::ReqbatchConfig;
use reqbatch_core::shared::models::{RequisitionGroup, REQUISITION_GROUPS};
use reqbatch_core::shared::store::InMemoryRecordStore;
use reqbatch_core::shared::terminal::ScriptedTerminal;
use reqbatch_core::OrchestrationResult;

pub const SHEET: &str = "Requisitions";
pub const HEADERS: [&str; 4] = ["Material", "Qtd", "Preço", "Status"];
pub const STATUS_COLUMN: usize = 4;

/// Default configuration without settle or retry waits
pub fn test_config() -> ReqbatchConfig {
    let mut config = ReqbatchConfig::default();
    config.submission.settle_delay_ms = 0;
    config.store.write_retry.interval_ms = 0;
    config
}

pub fn mrp_group() -> RequisitionGroup {
    REQUISITION_GROUPS[3]
}

pub fn run_context() -> RunContext {
    RunContext::new(
        mrp_group(),
        NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date"),
    )
}

/// Sheet row for a material at the given unit price
pub fn pending_row(material: &str, quantity: &str, unit_price: &str) -> Vec<String> {
    vec![
        material.to_string(),
        quantity.to_string(),
        unit_price.to_string(),
        String::new(),
    ]
}

pub fn store_with_rows(rows: Vec<Vec<String>>) -> InMemoryRecordStore {
    InMemoryRecordStore::new().with_sheet(SHEET, HEADERS, rows)
}

pub fn status_at(store: &InMemoryRecordStore, sheet_row: usize) -> String {
    store
        .cell(SHEET, sheet_row, STATUS_COLUMN)
        .unwrap_or_default()
}

/// Run one orchestration pass with the test configuration
pub async fn run_once(
    store: &InMemoryRecordStore,
    terminal: &mut ScriptedTerminal,
) -> OrchestrationResult<RunSummary> {
    let config = test_config();
    RequisitionOrchestrator::new(&config, store, terminal, run_context())
        .run()
        .await
}

/// Install a test subscriber once; later calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("reqbatch=debug")
        .try_init();
}
