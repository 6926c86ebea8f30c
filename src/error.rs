//! Error types for depwait
//!
//! Centralized error handling using thiserror. The waiter never returns
//! these; probe outcomes travel through `WaitOutcome`. Only target parsing,
//! configuration and report rendering can fail.

use thiserror::Error;

/// All error types that can occur outside of a wait cycle
#[derive(Debug, Error)]
pub enum DepwaitError {
    /// A dependency target string could not be understood
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Configuration is present but unusable
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DepwaitError {
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for depwait operations
pub type Result<T> = std::result::Result<T, DepwaitError>;
