//! Orchestration components, leaves first.

pub mod lifecycle;
pub mod orchestrator;
pub mod run_context;
pub mod status_interpreter;
pub mod value_classifier;
