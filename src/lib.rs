//! depwait - block service startup until its dependencies are reachable
//!
//! A `ReadinessWaiter` drives a `Probe` under a `RetryPolicy`: transient
//! failures are retried with a fixed or growing delay, fatal failures end
//! the wait at once, and every wait ends in a `WaitOutcome`.

pub mod cancel;
pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod probe;
pub mod report;
pub mod runner;
pub mod sleeper;
pub mod target;
pub mod waiter;

pub use cancel::CancelSignal;
pub use domain::{FailureKind, ProbeResult, WaitOutcome};
pub use error::{DepwaitError, Result};
pub use policy::{Attempts, RetryPolicy};
pub use probe::{Probe, probe_fn};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
pub use waiter::{ReadinessWaiter, wait};
