//! # reqbatch-orchestration
//!
//! The batch submission orchestrator: groups pending requisition records into
//! value buckets, drives each batch through the Transaction Terminal, isolates
//! failing records by per-record resubmission and reconciles every outcome
//! back to the Record Store.
//!
//! ```text
//! RecordStore ─▶ RequisitionOrchestrator ─▶ ValueClassifier
//!                      │
//!                      ▼
//!                BatchExecutor ◀──▶ TransactionTerminal
//!                      │   └──▶ StatusInterpreter
//!                      ▼
//!              FallbackController (recurses into BatchExecutor)
//!                      │
//!                      ▼
//!             ReconciliationWriter ─▶ RecordStore
//! ```

pub mod orchestration;

pub use orchestration::lifecycle::{
    BatchExecutor, BatchSubmission, FallbackController, FillFault, PersistReport,
    ReconciliationWriter, ResolvedRecord,
};
pub use orchestration::orchestrator::{
    build_plan, read_pending, BatchPlan, PendingSet, PlannedBatch, RequisitionOrchestrator,
    RunSummary,
};
pub use orchestration::run_context::RunContext;
pub use orchestration::status_interpreter::StatusInterpreter;
pub use orchestration::value_classifier::{Bucket, ValueClassifier};
