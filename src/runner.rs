//! Concurrent waiting on several dependencies.
//!
//! Each dependency gets its own task running an independent `wait`; the
//! tasks share nothing but the waiter's sleeper, cancel signal and observer.
//! A probe that panics takes down only its own task, and its dependency is
//! reported as rejected.

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::domain::WaitOutcome;
use crate::error::Result;
use crate::policy::RetryPolicy;
use crate::probe::Probe;
use crate::sleeper::Sleeper;
use crate::target::{ProbeSettings, Target};
use crate::waiter::ReadinessWaiter;

/// A dependency ready to be probed
pub struct Dependency {
    /// Display name
    pub name: String,
    /// Target description for reports
    pub target: String,
    pub probe: Box<dyn Probe>,
}

impl Dependency {
    pub fn new(target: impl Into<String>, probe: Box<dyn Probe>) -> Self {
        Self {
            name: probe.name().to_string(),
            target: target.into(),
            probe,
        }
    }

    /// Build the probe for a parsed target
    pub fn from_target(target: Target, settings: &ProbeSettings) -> Result<Self> {
        let spec = target.spec().to_string();
        let probe = target.into_probe(settings)?;
        Ok(Self::new(spec, probe))
    }
}

/// Final state of one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitReport {
    pub dependency: String,
    pub target: String,
    pub outcome: WaitOutcome,
}

/// Wait for every dependency concurrently and collect their reports in input order
pub async fn wait_for_all<S>(
    dependencies: Vec<Dependency>,
    waiter: Arc<ReadinessWaiter<S>>,
    policy: &RetryPolicy,
) -> Vec<WaitReport>
where
    S: Sleeper + 'static,
{
    debug!("Waiting for {} dependencies", dependencies.len());

    let tasks: Vec<_> = dependencies
        .into_iter()
        .map(|dependency| {
            let Dependency { name, target, probe } = dependency;
            let waiter = Arc::clone(&waiter);
            let policy = policy.clone();
            let handle = tokio::spawn(async move { waiter.wait(&probe, &policy).await });
            (name, target, handle)
        })
        .collect();

    join_all(tasks.into_iter().map(|(name, target, handle)| async move {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Probe task for '{}' failed: {}", name, e);
                WaitOutcome::rejected(1, format!("probe task failed: {}", e))
            }
        };
        WaitReport {
            dependency: name,
            target,
            outcome,
        }
    }))
    .await
}
