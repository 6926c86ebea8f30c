//! Outcome of a single readiness probe.

use serde::{Deserialize, Serialize};

/// Result of one probe invocation against one dependency.
///
/// Produced by a `Probe`, consumed immediately by the waiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ProbeResult {
    /// The dependency accepted the check
    Ready,
    /// Expected unavailability (connection refused, still starting up); retried
    TransientFailure(String),
    /// Configuration or logic error (bad credentials, bad address); never retried
    FatalFailure(String),
}

impl ProbeResult {
    pub fn ready() -> Self {
        Self::Ready
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::TransientFailure(reason.into())
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::FatalFailure(reason.into())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalFailure(_))
    }

    /// Failure reason, `None` when ready.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ready => None,
            Self::TransientFailure(reason) | Self::FatalFailure(reason) => Some(reason),
        }
    }

    /// Prefix the failure reason with `context`, keeping the classification
    pub fn with_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::Ready => Self::Ready,
            Self::TransientFailure(reason) => Self::TransientFailure(format!("{}: {}", context, reason)),
            Self::FatalFailure(reason) => Self::FatalFailure(format!("{}: {}", context, reason)),
        }
    }
}
