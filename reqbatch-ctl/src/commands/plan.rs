//! Dry-run batching preview
//!
//! Reads the sheet the same way a run does and prints the buckets and batches
//! pending records would be submitted in. The terminal is never touched.

use anyhow::Context;
use reqbatch_orchestration::{build_plan, read_pending, BatchPlan, ValueClassifier};
use reqbatch_shared::config::ReqbatchConfig;
use reqbatch_shared::store::SheetsRecordStore;

use crate::output;

pub(crate) async fn handle_plan_command(json: bool, config: &ReqbatchConfig) -> anyhow::Result<()> {
    let classifier = ValueClassifier::new(&config.classification)?;
    let store =
        SheetsRecordStore::from_config(&config.store).context("failed to set up the sheet client")?;

    if !json {
        output::dim(format!("Reading sheet '{}'...", config.store.sheet_name));
    }
    let pending = read_pending(&store, &config.store, &config.status.reprocess_marker).await?;
    let rows_read = pending.rows_read;
    let plan = build_plan(&classifier, pending.records);

    if json {
        output::plain(serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan, rows_read);
    }
    Ok(())
}

fn print_plan(plan: &BatchPlan, rows_read: usize) {
    output::header("Submission plan");
    output::label("Rows read", rows_read);
    output::label("Pending records", plan.record_count());
    output::label("Batches", plan.len());

    if plan.is_empty() {
        output::blank();
        output::success("Nothing to submit");
        return;
    }

    for bucket in plan.buckets() {
        output::blank();
        output::bucket(bucket, format!("{} batch(es)", plan.batches_in(bucket)));
        for batch in plan.batches.iter().filter(|b| b.bucket == bucket) {
            let rows: Vec<String> = batch.records.iter().map(|r| r.row.to_string()).collect();
            output::item(format!(
                "batch {}: {} record(s), rows {}",
                batch.index,
                batch.records.len(),
                rows.join(", ")
            ));
        }
    }
}
