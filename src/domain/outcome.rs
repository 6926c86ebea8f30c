//! Wait cycle outcome types.
//!
//! This module defines the result of a full `wait` call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a wait cycle ended without the dependency becoming ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Retry budget used up on transient failures
    Exhausted,
    /// The probe reported a fatal failure
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Exhausted => write!(f, "exhausted"),
            FailureKind::Rejected => write!(f, "rejected"),
        }
    }
}

/// Outcome of a wait cycle. `attempts` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WaitOutcome {
    /// Dependency reported ready on attempt `attempts`
    Succeeded { attempts: u32 },
    /// Gave up or was rejected after `attempts` probes
    Failed {
        attempts: u32,
        reason: String,
        kind: FailureKind,
    },
    /// Cancellation was observed after `attempts` probes
    Cancelled { attempts: u32 },
}

impl WaitOutcome {
    pub fn succeeded(attempts: u32) -> Self {
        Self::Succeeded { attempts }
    }

    pub fn exhausted(attempts: u32, reason: impl Into<String>) -> Self {
        Self::Failed {
            attempts,
            reason: reason.into(),
            kind: FailureKind::Exhausted,
        }
    }

    pub fn rejected(attempts: u32, reason: impl Into<String>) -> Self {
        Self::Failed {
            attempts,
            reason: reason.into(),
            kind: FailureKind::Rejected,
        }
    }

    pub fn cancelled(attempts: u32) -> Self {
        Self::Cancelled { attempts }
    }

    /// Number of probe invocations made during the cycle.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts } | Self::Failed { attempts, .. } | Self::Cancelled { attempts } => {
                *attempts
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Last failure reason, if the cycle failed.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { attempts } => write!(f, "ready after {} attempt(s)", attempts),
            Self::Failed {
                attempts,
                reason,
                kind: FailureKind::Exhausted,
            } => write!(f, "gave up after {} attempt(s): {}", attempts, reason),
            Self::Failed {
                attempts,
                reason,
                kind: FailureKind::Rejected,
            } => write!(f, "rejected on attempt {}: {}", attempts, reason),
            Self::Cancelled { attempts } => write!(f, "cancelled after {} attempt(s)", attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_outcome_attempts() {
        assert_eq!(WaitOutcome::succeeded(3).attempts(), 3);
        assert_eq!(WaitOutcome::exhausted(4, "refused").attempts(), 4);
        assert_eq!(WaitOutcome::rejected(1, "denied").attempts(), 1);
        assert_eq!(WaitOutcome::cancelled(2).attempts(), 2);
    }

    #[test]
    fn test_wait_outcome_kind_distinguishes_failures() {
        let exhausted = WaitOutcome::exhausted(5, "refused");
        let rejected = WaitOutcome::rejected(5, "refused");
        assert_ne!(exhausted, rejected);
        assert_eq!(exhausted.failure_kind(), Some(FailureKind::Exhausted));
        assert_eq!(rejected.failure_kind(), Some(FailureKind::Rejected));
        assert_eq!(WaitOutcome::succeeded(1).failure_kind(), None);
    }

    #[test]
    fn test_wait_outcome_reason() {
        assert_eq!(WaitOutcome::exhausted(2, "timed out").reason(), Some("timed out"));
        assert_eq!(WaitOutcome::succeeded(1).reason(), None);
        assert_eq!(WaitOutcome::cancelled(1).reason(), None);
    }

    #[test]
    fn test_wait_outcome_display() {
        assert_eq!(WaitOutcome::succeeded(2).to_string(), "ready after 2 attempt(s)");
        assert_eq!(
            WaitOutcome::exhausted(4, "connection refused").to_string(),
            "gave up after 4 attempt(s): connection refused"
        );
        assert_eq!(
            WaitOutcome::rejected(1, "authentication failed").to_string(),
            "rejected on attempt 1: authentication failed"
        );
    }

    #[test]
    fn test_wait_outcome_json_shape() {
        let json = serde_json::to_value(WaitOutcome::rejected(2, "denied")).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["attempts"], 2);
        assert_eq!(json["kind"], "rejected");
        assert_eq!(json["reason"], "denied");
    }
}
