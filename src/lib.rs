//! # reqbatch-core
//!
//! Facade over the reqbatch workspace. Submits purchase-requisition records
//! from a spreadsheet into an ERP transaction and writes each outcome back.
//!
//! - [`reqbatch_shared`]: configuration, models, errors, logging and the
//!   Record Store / Transaction Terminal adapters
//! - [`reqbatch_orchestration`]: the batch submission orchestrator

pub use reqbatch_orchestration as orchestration;
pub use reqbatch_shared as shared;

pub use reqbatch_orchestration::{RequisitionOrchestrator, RunContext, RunSummary};
pub use reqbatch_shared::{OrchestrationError, OrchestrationResult, ReqbatchConfig};
