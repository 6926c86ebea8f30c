//! Domain types for depwait.
//!
//! - `ProbeResult`: outcome of one readiness check
//! - `WaitOutcome`: outcome of a whole wait cycle

pub mod outcome;
pub mod probe_result;

pub use outcome::{FailureKind, WaitOutcome};
pub use probe_result::ProbeResult;
