//! Failure classification shared by the built-in probes.
//!
//! Transient failures include:
//! - Connection refused or reset (dependency still starting)
//! - Timeouts
//! - Host or network unreachable
//! - DNS resolution failures (container names appear late)
//! - "database system is starting up" and similar
//!
//! Fatal failures include:
//! - Authentication or authorization rejections
//! - Malformed addresses
//! - Anything not recognized as transient

use std::io;

use crate::domain::ProbeResult;

const RETRYABLE_PATTERNS: &[&str] = &[
    "timeout",
    "timed out",
    "connection refused",
    "connection reset",
    "connection aborted",
    "broken pipe",
    "network unreachable",
    "network is unreachable",
    "no route to host",
    "host is down",
    "host unreachable",
    "temporarily unavailable",
    "temporary failure",
    "try again",
    "starting up",
    "not yet accepting connections",
    "service unavailable",
    "database is locked",
    "database is busy",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "could not resolve",
    "name resolution",
    "dns",
];

const NON_RETRYABLE_PATTERNS: &[&str] = &[
    "authentication failed",
    "password authentication",
    "access denied",
    "access is denied",
    "permission denied",
    "unauthorized",
    "forbidden",
    "invalid credentials",
    "not a database",
    "malformed",
    "invalid",
];

/// Whether a failure message describes a retryable condition.
///
/// Non-retryable patterns win, unknown messages are not retryable.
pub fn is_transient_message(message: &str) -> bool {
    let lowercase = message.to_lowercase();

    if NON_RETRYABLE_PATTERNS.iter().any(|p| lowercase.contains(p)) {
        return false;
    }

    RETRYABLE_PATTERNS.iter().any(|p| lowercase.contains(p))
}

/// Classify a failure message
pub fn message(message: impl Into<String>) -> ProbeResult {
    let message = message.into();
    if is_transient_message(&message) {
        ProbeResult::TransientFailure(message)
    } else {
        ProbeResult::FatalFailure(message)
    }
}

/// Classify an IO error by kind, falling back to its message
pub fn io_error(err: &io::Error) -> ProbeResult {
    use io::ErrorKind::*;

    match err.kind() {
        ConnectionRefused | ConnectionReset | ConnectionAborted | NotConnected | TimedOut
        | Interrupted | WouldBlock | AddrNotAvailable | HostUnreachable | NetworkUnreachable
        | NetworkDown | UnexpectedEof | BrokenPipe => ProbeResult::transient(err.to_string()),
        PermissionDenied | InvalidInput | InvalidData | Unsupported => ProbeResult::fatal(err.to_string()),
        _ => message(err.to_string()),
    }
}
