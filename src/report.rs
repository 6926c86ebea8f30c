//! Aggregated results and process exit codes.

use serde::Serialize;

use crate::domain::{FailureKind, WaitOutcome};
use crate::error::Result;
use crate::runner::WaitReport;

/// Exit code when every dependency is ready
pub const EXIT_READY: i32 = 0;
/// Exit code when a retry budget ran out
pub const EXIT_EXHAUSTED: i32 = 1;
/// Exit code when a dependency rejected the check
pub const EXIT_REJECTED: i32 = 2;
/// Exit code when the wait was interrupted
pub const EXIT_CANCELLED: i32 = 130;

/// Results of one run across all dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ready: bool,
    pub exit_code: i32,
    pub dependencies: Vec<WaitReport>,
}

impl Summary {
    pub fn new(dependencies: Vec<WaitReport>) -> Self {
        let exit_code = exit_code(&dependencies);
        Self {
            ready: exit_code == EXIT_READY,
            exit_code,
            dependencies,
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &WaitReport> {
        self.dependencies.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Cancellation beats rejection, rejection beats exhaustion
pub fn exit_code(reports: &[WaitReport]) -> i32 {
    let mut code = EXIT_READY;
    for report in reports {
        let this = match &report.outcome {
            WaitOutcome::Succeeded { .. } => EXIT_READY,
            WaitOutcome::Failed {
                kind: FailureKind::Exhausted,
                ..
            } => EXIT_EXHAUSTED,
            WaitOutcome::Failed {
                kind: FailureKind::Rejected,
                ..
            } => EXIT_REJECTED,
            WaitOutcome::Cancelled { .. } => return EXIT_CANCELLED,
        };
        code = code.max(this);
    }
    code
}
