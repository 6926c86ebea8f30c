//! Readiness probes.
//!
//! A probe performs exactly one readiness check against one dependency and
//! classifies the result itself. Expected unavailability must come back as
//! `ProbeResult::TransientFailure`; a probe that panics is defective, and
//! callers running it in a task treat the panic as a fatal failure.
//!
//! Built-in probes:
//! - `TcpProbe`: a TCP connect
//! - `HttpProbe`: an HTTP GET expecting 2xx
//! - `SqliteProbe`: open a SQLite database and read its schema
//! - `CommandProbe`: a shell command expecting exit status 0
//! - `ScriptedProbe`: replays canned results, for tests

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ProbeResult;

pub mod classify;
pub mod command;
pub mod http;
pub mod scripted;
pub mod sqlite;
pub mod tcp;

pub use command::CommandProbe;
pub use http::HttpProbe;
pub use scripted::ScriptedProbe;
pub use sqlite::SqliteProbe;
pub use tcp::TcpProbe;

/// One readiness check against one dependency
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run a single check
    async fn check(&self) -> ProbeResult;

    /// Name of the dependency this probe checks, for logs and reports
    fn name(&self) -> &str {
        "probe"
    }
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Box<P> {
    async fn check(&self) -> ProbeResult {
        (**self).check().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Arc<P> {
    async fn check(&self) -> ProbeResult {
        (**self).check().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Probe built from a zero-argument async closure
pub struct FnProbe<F> {
    name: String,
    check: F,
}

/// Wrap a closure returning a future of `ProbeResult` as a probe
pub fn probe_fn<F, Fut>(name: impl Into<String>, check: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send,
{
    FnProbe {
        name: name.into(),
        check,
    }
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send,
{
    async fn check(&self) -> ProbeResult {
        (self.check)().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
