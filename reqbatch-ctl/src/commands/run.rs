//! Submission run

use anyhow::{anyhow, Context};
use reqbatch_orchestration::{RequisitionOrchestrator, RunContext, RunSummary};
use reqbatch_shared::config::ReqbatchConfig;
use reqbatch_shared::models::{GroupSelection, RequisitionGroup};
use reqbatch_shared::store::SheetsRecordStore;
use reqbatch_shared::terminal::BridgeTerminal;
use tracing::info;

use crate::output::{self, Tone};
use crate::prompt;

pub(crate) async fn handle_run_command(
    group: Option<String>,
    config: &ReqbatchConfig,
) -> anyhow::Result<()> {
    let group = match group {
        Some(code) => RequisitionGroup::from_code(&code)
            .ok_or_else(|| anyhow!("unknown requisition group '{code}' (expected P01..P07)"))?,
        None => {
            let stdin = std::io::stdin();
            let selection = prompt::select_group(&mut stdin.lock(), &mut std::io::stdout())?;
            match selection {
                GroupSelection::Group(group) => group,
                GroupSelection::Exit => {
                    output::dim("Exiting without submitting");
                    return Ok(());
                }
            }
        }
    };

    let context = RunContext::for_today(group, config.submission.delivery_lookahead_days);
    output::header("Starting run");
    output::label("Requisition group", group);
    output::label("Delivery date", context.delivery_date_text());
    output::label("Sheet", &config.store.sheet_name);
    output::label("Correlation id", context.correlation_id);

    let store =
        SheetsRecordStore::from_config(&config.store).context("failed to set up the sheet client")?;
    let mut terminal = BridgeTerminal::spawn(&config.terminal)
        .await
        .with_context(|| format!("failed to start terminal bridge '{}'", config.terminal.program))?;

    let summary = RequisitionOrchestrator::new(config, &store, &mut terminal, context)
        .run()
        .await?;
    info!(
        correlation_id = %summary.correlation_id,
        succeeded = summary.succeeded,
        hard_failures = summary.hard_failures,
        unknown = summary.unknown,
        "Run finished"
    );

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    output::blank();
    output::header("Run summary");
    output::count("Rows read", summary.rows_read, Tone::Neutral);
    output::count("Pending", summary.pending, Tone::Neutral);
    output::count("Batches", summary.batches, Tone::Neutral);
    output::count("Submissions", summary.submissions, Tone::Neutral);
    output::count("Individual resubmissions", summary.fallback_submissions, Tone::Doubtful);
    output::count("Succeeded", summary.succeeded, Tone::Good);
    output::count("Failed", summary.hard_failures, Tone::Bad);
    output::count("Ambiguous", summary.unknown, Tone::Doubtful);
    output::count("Status writes abandoned", summary.writes_abandoned, Tone::Bad);
    output::blank();

    if summary.pending == 0 {
        output::success("Nothing was pending");
    } else if summary.writes_abandoned > 0 {
        output::warning(format!(
            "{} status write(s) were abandoned; those rows will be submitted again on the next run",
            summary.writes_abandoned
        ));
    } else if summary.hard_failures + summary.unknown == 0 {
        output::success("Every pending record was submitted");
    } else {
        output::warning("Some records did not succeed; see their status cells");
    }
}
