//! Retry budget and delay schedule for a wait cycle.
//!
//! A `RetryPolicy` is built once and never mutated; the waiter derives each
//! delay from it with `delay_for`, so the schedule is a pure function of the
//! attempt number.

use std::fmt;
use std::time::Duration;

/// Maximum number of probe attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempts {
    /// At most this many probes. Zero is read as one.
    Limited(u32),
    /// Probe until ready, fatal or cancelled.
    Unbounded,
}

impl Attempts {
    /// Budget of `n` attempts, where `0` means a single attempt.
    pub fn limited(n: u32) -> Self {
        Attempts::Limited(n.max(1))
    }

    /// Whether another probe may follow attempt number `made` (1-based).
    pub fn allows_after(&self, made: u32) -> bool {
        match self {
            Attempts::Limited(max) => made < (*max).max(1),
            Attempts::Unbounded => true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Attempts::Unbounded)
    }
}

impl Default for Attempts {
    fn default() -> Self {
        Attempts::Limited(1)
    }
}

impl fmt::Display for Attempts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempts::Limited(max) => write!(f, "{}", (*max).max(1)),
            Attempts::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Immutable retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Probe attempt budget
    pub max_attempts: Attempts,
    /// Delay after the first failed attempt
    pub delay: Duration,
    /// Growth factor applied to the delay after each failed attempt
    pub backoff_multiplier: Option<f64>,
    /// Upper bound for the grown delay
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Attempts::default(),
            delay: Duration::ZERO,
            backoff_multiplier: None,
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Fixed-delay policy with `max_attempts` probes (`0` means one).
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Attempts::limited(max_attempts),
            delay,
            ..Default::default()
        }
    }

    /// Single attempt, never sleeps
    pub fn once() -> Self {
        Self::default()
    }

    /// Remove the attempt budget
    pub fn unbounded(mut self) -> Self {
        self.max_attempts = Attempts::Unbounded;
        self
    }

    /// Multiply the delay by `multiplier` after every failed attempt
    pub fn with_backoff(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    /// Cap the grown delay
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay to sleep after failed attempt number `failed_attempt` (1-based).
    ///
    /// Multipliers that are not finite or not above 1.0 keep the delay fixed.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let growth = match self.backoff_multiplier {
            Some(m) if m.is_finite() && m > 1.0 => m,
            _ => return self.cap(self.delay),
        };
        if self.delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = failed_attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.delay.as_secs_f64() * growth.powi(exponent);
        let grown = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
        self.cap(grown)
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}
