//! # Resilience
//!
//! Fault-tolerance primitives for collaborator calls.
//!
//! The Record Store is a rate-limited remote API: a write may be rejected
//! transiently under quota pressure. [`RetryPolicy`] retries such calls a
//! bounded number of times at a fixed interval; it never polls indefinitely.

pub mod retry;

pub use retry::{RetryOutcome, RetryPolicy};
