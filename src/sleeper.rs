//! Injectable sleep capability.
//!
//! The waiter never calls `tokio::time::sleep` directly; it goes through a
//! `Sleeper` so tests can record delays instead of waiting them out.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Pauses the current task between probe attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that records each requested duration and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.calls().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(duration);
        }
    }
}

#[async_trait]
impl<S: Sleeper + ?Sized> Sleeper for std::sync::Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn test_recording_sleeper_records_without_waiting() {
        let sleeper = RecordingSleeper::new();
        let start = Instant::now();
        sleeper.sleep(Duration::from_secs(60)).await;
        sleeper.sleep(Duration::from_secs(30)).await;

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(sleeper.count(), 2);
        assert_eq!(sleeper.calls(), vec![Duration::from_secs(60), Duration::from_secs(30)]);
        assert_eq!(sleeper.total(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_arc_sleeper_delegates() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let shared = Arc::clone(&sleeper);
        shared.sleep(Duration::from_millis(5)).await;
        assert_eq!(sleeper.count(), 1);
    }

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let start = Instant::now();
        TokioSleeper.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_tokio_sleeper_zero_returns() {
        TokioSleeper.sleep(Duration::ZERO).await;
    }
}
