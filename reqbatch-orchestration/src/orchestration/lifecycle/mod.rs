//! Per-batch lifecycle: submit, isolate failures, reconcile.

pub mod batch_executor;
pub mod fallback_controller;
pub mod reconciliation_writer;

pub use batch_executor::{BatchExecutor, BatchSubmission, FillFault, NOTHING_POPULATED};
pub use fallback_controller::{FallbackController, ResolvedRecord};
pub use reconciliation_writer::{PersistReport, ReconciliationWriter};
