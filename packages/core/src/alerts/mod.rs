//! Alerting
//!
//! Debounce state for proactive alerts and the texts sent to the operator.

pub mod debouncer;
pub mod message;

pub use debouncer::{AlertDebouncer, AlertDecision, AlertRecordEntry};
