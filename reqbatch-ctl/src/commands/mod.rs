//! Command handlers for reqbatch-ctl
//!
//! Each module handles one subcommand; the orchestration itself lives in
//! `reqbatch-orchestration`.

pub(crate) mod buckets;
pub(crate) mod config;
pub(crate) mod plan;
pub(crate) mod run;

pub(crate) use buckets::handle_buckets_command;
pub(crate) use config::handle_config_command;
pub(crate) use plan::handle_plan_command;
pub(crate) use run::handle_run_command;
