//! # Domain Models
//!
//! Records read from the Record Store, the outcomes attached to them, and the
//! requisition groups an operator can choose from.

pub mod outcome;
pub mod record;
pub mod requisition_group;

pub use outcome::{Outcome, OutcomeKind};
pub use record::{needs_submission, PendingRecord, FIRST_DATA_ROW};
pub use requisition_group::{GroupSelection, RequisitionGroup, EXIT_OPTION, REQUISITION_GROUPS};
