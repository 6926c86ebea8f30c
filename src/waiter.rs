//! Readiness waiter - drives one probe until the dependency is ready.
//!
//! Each attempt:
//! 1. Checks for cancellation (skipped before the first attempt)
//! 2. Invokes the probe exactly once
//! 3. Ready: returns `Succeeded` with no further sleep
//! 4. Fatal: returns `Failed { kind: Rejected }` immediately
//! 5. Transient: sleeps and retries while the budget allows, otherwise
//!    returns `Failed { kind: Exhausted }`
//!
//! The waiter owns no connections; all effects go through the probe and the
//! injected `Sleeper`. Waiting on several dependencies at once is the
//! caller's job (see `runner`).

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::cancel::CancelSignal;
use crate::domain::{ProbeResult, WaitOutcome};
use crate::policy::{Attempts, RetryPolicy};
use crate::probe::Probe;
use crate::sleeper::{Sleeper, TokioSleeper};

/// Progress report emitted after every probe invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptEvent {
    /// Dependency name as reported by the probe
    pub dependency: String,
    /// 1-based attempt number
    pub attempt: u32,
    /// Attempt budget in force
    pub max_attempts: Attempts,
    /// What the probe reported
    pub result: ProbeResult,
    /// Delay before the next attempt, `None` if this attempt was the last
    pub next_delay: Option<Duration>,
}

/// Callback receiving every `AttemptEvent`
pub type AttemptObserver = Arc<dyn Fn(&AttemptEvent) + Send + Sync>;

/// Drives a probe until ready, rejected, exhausted or cancelled.
///
/// Holds no per-call state, so one waiter can serve any number of
/// concurrent `wait` calls.
pub struct ReadinessWaiter<S: Sleeper = TokioSleeper> {
    sleeper: S,
    cancel: Option<CancelSignal>,
    observer: Option<AttemptObserver>,
}

impl ReadinessWaiter<TokioSleeper> {
    /// Create a waiter that sleeps on the tokio timer
    pub fn new() -> Self {
        Self::with_sleeper(TokioSleeper)
    }
}

impl Default for ReadinessWaiter<TokioSleeper> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sleeper> ReadinessWaiter<S> {
    /// Create a waiter with a custom sleep capability
    pub fn with_sleeper(sleeper: S) -> Self {
        Self {
            sleeper,
            cancel: None,
            observer: None,
        }
    }

    /// Stop waiting once `cancel` is tripped
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Report every attempt to `observer`
    pub fn with_observer(mut self, observer: impl Fn(&AttemptEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Probe until the dependency is ready or the policy gives up.
    ///
    /// Never fails; every ending is described by the returned outcome, whose
    /// attempt count is at least 1.
    pub async fn wait<P: Probe + ?Sized>(&self, probe: &P, policy: &RetryPolicy) -> WaitOutcome {
        let dependency = probe.name();
        if policy.max_attempts.is_unbounded() {
            warn!("Waiting for '{}' without an attempt limit", dependency);
        }
        debug!(
            "Waiting for '{}' (max attempts: {}, delay: {:?})",
            dependency, policy.max_attempts, policy.delay
        );

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 && self.is_cancelled() {
                info!("Wait for '{}' cancelled after {} attempt(s)", dependency, attempt);
                return WaitOutcome::cancelled(attempt);
            }

            attempt = attempt.saturating_add(1);
            let result = probe.check().await;

            let retry = result.is_transient() && policy.max_attempts.allows_after(attempt);
            let next_delay = retry.then(|| policy.delay_for(attempt));
            self.report(AttemptEvent {
                dependency: dependency.to_string(),
                attempt,
                max_attempts: policy.max_attempts,
                result: result.clone(),
                next_delay,
            });

            match result {
                ProbeResult::Ready => {
                    info!("'{}' ready after {} attempt(s)", dependency, attempt);
                    return WaitOutcome::succeeded(attempt);
                }
                ProbeResult::FatalFailure(reason) => {
                    error!("'{}' rejected on attempt {}: {}", dependency, attempt, reason);
                    return WaitOutcome::rejected(attempt, reason);
                }
                ProbeResult::TransientFailure(reason) => {
                    let Some(delay) = next_delay else {
                        error!("Gave up on '{}' after {} attempt(s): {}", dependency, attempt, reason);
                        return WaitOutcome::exhausted(attempt, reason);
                    };

                    warn!(
                        "'{}' unavailable (attempt {}/{}): {}. Retrying in {:?}",
                        dependency, attempt, policy.max_attempts, reason, delay
                    );

                    if self.is_cancelled() || !self.pause(delay).await {
                        info!("Wait for '{}' cancelled after {} attempt(s)", dependency, attempt);
                        return WaitOutcome::cancelled(attempt);
                    }
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    /// Sleep for `delay`; false if cancelled while sleeping
    async fn pause(&self, delay: Duration) -> bool {
        match &self.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    _ = self.sleeper.sleep(delay) => true,
                }
            }
            None => {
                self.sleeper.sleep(delay).await;
                true
            }
        }
    }

    fn report(&self, event: AttemptEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}

/// Wait for `probe` with the production sleeper and no cancellation
pub async fn wait<P: Probe + ?Sized>(probe: &P, policy: &RetryPolicy) -> WaitOutcome {
    ReadinessWaiter::new().wait(probe, policy).await
}
