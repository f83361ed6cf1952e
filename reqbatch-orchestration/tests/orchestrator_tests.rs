//! Orchestrator runs against the in-memory store and scripted terminal.

use chrono::NaiveDate;
use reqbatch_orchestration::{RequisitionOrchestrator, RunContext, RunSummary};
use reqbatch_shared::config::ReqbatchConfig;
use reqbatch_shared::errors::OrchestrationError;
use reqbatch_shared::models::REQUISITION_GROUPS;
use reqbatch_shared::store::InMemoryRecordStore;
use reqbatch_shared::terminal::{ScriptedTerminal, Severity};

const SHEET: &str = "Requisitions";
const STATUS_COLUMN: usize = 4;

fn fast_config() -> ReqbatchConfig {
    let mut config = ReqbatchConfig::default();
    config.submission.settle_delay_ms = 0;
    config.store.write_retry.interval_ms = 0;
    config
}

fn context() -> RunContext {
    RunContext::new(
        REQUISITION_GROUPS[3],
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
    )
}

fn sheet(rows: Vec<Vec<String>>) -> InMemoryRecordStore {
    InMemoryRecordStore::new().with_sheet(SHEET, ["Material", "Qtd", "Preço", "Status"], rows)
}

fn row(material: &str, price: &str, status: &str) -> Vec<String> {
    vec![
        material.to_string(),
        "1".to_string(),
        price.to_string(),
        status.to_string(),
    ]
}

async fn run(
    config: &ReqbatchConfig,
    store: &InMemoryRecordStore,
    terminal: &mut ScriptedTerminal,
) -> Result<RunSummary, OrchestrationError> {
    RequisitionOrchestrator::new(config, store, terminal, context())
        .run()
        .await
}

fn status_of(store: &InMemoryRecordStore, sheet_row: usize) -> String {
    store
        .cell(SHEET, sheet_row, STATUS_COLUMN)
        .unwrap_or_default()
}

#[tokio::test]
async fn test_low_value_records_share_one_batch() {
    let config = fast_config();
    let store = sheet((1..=3).map(|i| row(&format!("MAT-{i}"), "100", "")).collect());
    let mut terminal = ScriptedTerminal::new().with_commit_text("Requisition 4500000001 created");

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    assert_eq!(summary.batches, 1);
    assert_eq!(summary.submissions, 1);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(terminal.transactions()[0].materials.len(), 3);
    for sheet_row in 2..=4 {
        assert_eq!(status_of(&store, sheet_row), "4500000001");
    }
}

#[tokio::test]
async fn test_batches_are_capped_at_bucket_size() {
    let config = fast_config();
    let store = sheet((1..=23).map(|i| row(&format!("MAT-{i}"), "10", "")).collect());
    let mut terminal = ScriptedTerminal::new();

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    let sizes: Vec<usize> = terminal
        .transactions()
        .iter()
        .map(|t| t.materials.len())
        .collect();
    assert_eq!(sizes, vec![10, 10, 3]);
    assert_eq!(summary.succeeded, 23);
    // documents are numbered per batch
    assert_eq!(status_of(&store, 2), "10000001");
    assert_eq!(status_of(&store, 12), "10000002");
    assert_eq!(status_of(&store, 24), "10000003");
}

#[tokio::test]
async fn test_failed_batch_isolates_the_faulty_record() {
    let config = fast_config();
    let store = sheet(vec![
        row("MAT-1", "100", ""),
        row("MAT-2", "100", ""),
        row("MAT-3", "100", "NAO"),
    ]);
    let mut terminal =
        ScriptedTerminal::new().with_validation_error("MAT-2", "Material MAT-2 is blocked");

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    assert_eq!(summary.batches, 1);
    assert_eq!(summary.fallback_submissions, 3);
    assert_eq!(summary.submissions, 4);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.hard_failures, 1);
    assert_eq!(status_of(&store, 3), "Material MAT-2 is blocked");
    assert!(status_of(&store, 2).chars().all(|c| c.is_ascii_digit()));
    assert!(status_of(&store, 4).chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_ambiguous_status_is_persisted_verbatim() {
    let config = fast_config();
    let store = sheet(vec![row("MAT-1", "250000", "")]);
    let mut terminal =
        ScriptedTerminal::new().with_commit_status(Severity::Other, "Document is being processed");

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    assert_eq!(summary.unknown, 1);
    assert_eq!(summary.fallback_submissions, 0);
    assert_eq!(status_of(&store, 2), "Document is being processed");
}

#[tokio::test]
async fn test_fill_fault_is_not_credited_with_batch_success() {
    let config = fast_config();
    let store = sheet(vec![
        row("MAT-1", "100", ""),
        row("BROKEN", "100", ""),
        row("MAT-3", "100", ""),
    ]);
    let mut terminal = ScriptedTerminal::new()
        .with_fill_fault("BROKEN")
        .with_commit_text("Requisition 4500012345 created");

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    assert_eq!(summary.submissions, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.hard_failures, 1);
    assert_eq!(status_of(&store, 2), "4500012345");
    assert!(status_of(&store, 3).contains("BROKEN"));
    assert_eq!(status_of(&store, 4), "4500012345");
}

#[tokio::test]
async fn test_transient_write_fault_is_retried() {
    let config = fast_config();
    let store = sheet(vec![row("MAT-1", "100", "")]);
    store.fail_next_writes(1);
    let mut terminal = ScriptedTerminal::new();

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    assert_eq!(summary.writes_abandoned, 0);
    assert_eq!(store.write_attempts(), 2);
    assert_eq!(status_of(&store, 2), "10000001");
}

#[tokio::test]
async fn test_abandoned_writes_do_not_stop_the_run() {
    let config = fast_config();
    let store = sheet(vec![row("MAT-1", "100", ""), row("MAT-2", "300000", "")]);
    store.fail_next_writes(2);
    let mut terminal = ScriptedTerminal::new();

    let summary = run(&config, &store, &mut terminal).await.unwrap();

    assert_eq!(summary.writes_abandoned, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(status_of(&store, 2), "");
    assert_eq!(status_of(&store, 3), "10000002");
}

#[tokio::test]
async fn test_missing_status_column_writes_past_last_header() {
    let config = fast_config();
    let store = InMemoryRecordStore::new().with_sheet(
        SHEET,
        ["Material", "Qtd", "Preço"],
        vec![vec!["MAT-1", "1", "100"]],
    );
    let mut terminal = ScriptedTerminal::new();

    run(&config, &store, &mut terminal).await.unwrap();

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].column, 4);
}

#[tokio::test]
async fn test_missing_sheet_is_a_configuration_failure() {
    let mut config = fast_config();
    config.store.sheet_name = "Elsewhere".to_string();
    let store = sheet(vec![row("MAT-1", "100", "")]);
    let mut terminal = ScriptedTerminal::new();

    let error = run(&config, &store, &mut terminal).await.unwrap_err();

    assert!(matches!(error, OrchestrationError::ConfigurationFailure(_)));
    assert_eq!(terminal.transactions_opened(), 0);
}

#[tokio::test]
async fn test_invalid_bucket_table_is_a_configuration_failure() {
    let mut config = fast_config();
    config.classification.buckets.clear();
    let store = sheet(vec![row("MAT-1", "100", "")]);
    let mut terminal = ScriptedTerminal::new();

    let error = run(&config, &store, &mut terminal).await.unwrap_err();
    assert!(matches!(error, OrchestrationError::ConfigurationFailure(_)));
}

#[tokio::test]
async fn test_rerun_only_submits_records_still_pending() {
    let config = fast_config();
    let store = sheet(vec![row("MAT-1", "100", ""), row("MAT-2", "300000", "")]);
    let mut terminal = ScriptedTerminal::new().with_commit_error("MAT-2", "Budget exceeded");

    let first = run(&config, &store, &mut terminal).await.unwrap();
    assert_eq!(first.pending, 2);

    // MAT-2's failure text is a handled status, so nothing is left
    let mut second_terminal = ScriptedTerminal::new();
    let second = run(&config, &store, &mut second_terminal).await.unwrap();
    assert_eq!(second.rows_read, 2);
    assert_eq!(second.pending, 0);
    assert_eq!(second_terminal.transactions_opened(), 0);
}
