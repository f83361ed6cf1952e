//! # reqbatch-shared
//!
//! Components shared by the requisition orchestrator and the `reqbatch-ctl` binary:
//!
//! - [`config`]: layered configuration (defaults, TOML file, environment)
//! - [`errors`]: error taxonomy for configuration, store, terminal and orchestration faults
//! - [`logging`]: tracing subscriber initialization
//! - [`models`]: pending records, outcomes and requisition groups
//! - [`formatting`]: locale decimal normalization for submission fields
//! - [`resilience`]: bounded retry policy
//! - [`terminal`]: the Transaction Terminal capability and its adapters
//! - [`store`]: the Record Store capability and its adapters

pub mod config;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod models;
pub mod resilience;
pub mod store;
pub mod terminal;

pub use config::ReqbatchConfig;
pub use errors::{
    ConfigError, OrchestrationError, OrchestrationResult, StoreError, StoreResult, TerminalError,
    TerminalResult,
};
