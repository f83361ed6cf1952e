//! # reqbatch-ctl
//!
//! Operator CLI for the requisition orchestrator: run a submission pass,
//! preview how pending records will be batched, and inspect the effective
//! configuration.

mod commands;
mod output;
mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqbatch_shared::config::load_config;
use reqbatch_shared::logging::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "reqbatch-ctl", version, about, styles = output::clap_styles())]
struct Cli {
    /// Configuration file (defaults to ./reqbatch.toml, then ~/.config/reqbatch.toml)
    #[arg(long, global = true, env = "REQBATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit every pending record of the sheet
    Run {
        /// Requisition group code (P01..P07); prompts when omitted
        #[arg(long)]
        group: Option<String>,
    },
    /// Show how pending records would be batched, without submitting
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the configured value buckets
    Buckets,
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(error) = dispatch(cli).await {
        output::error(format!("{error:#}"));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { group } => commands::handle_run_command(group, &config).await,
        Commands::Plan { json } => commands::handle_plan_command(json, &config).await,
        Commands::Buckets => commands::handle_buckets_command(&config),
        Commands::Config => commands::handle_config_command(&config),
    }
}
