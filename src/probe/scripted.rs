//! Probe that replays a fixed sequence of results.
//!
//! Useful for testing startup code without a real dependency. Once the
//! script runs out, the last result repeats.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::Probe;
use crate::domain::ProbeResult;

pub struct ScriptedProbe {
    name: String,
    script: Mutex<VecDeque<ProbeResult>>,
    last: Mutex<ProbeResult>,
    calls: AtomicU32,
}

impl ScriptedProbe {
    pub fn new(name: impl Into<String>, script: impl IntoIterator<Item = ProbeResult>) -> Self {
        let script: VecDeque<ProbeResult> = script.into_iter().collect();
        let last = script.back().cloned().unwrap_or(ProbeResult::Ready);
        Self {
            name: name.into(),
            script: Mutex::new(script),
            last: Mutex::new(last),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of times `check` has been called
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn check(&self) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(result) => result,
            None => self
                .last
                .lock()
                .map(|last| last.clone())
                .unwrap_or(ProbeResult::Ready),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_probe_replays_in_order() {
        let probe = ScriptedProbe::new(
            "db",
            vec![ProbeResult::transient("refused"), ProbeResult::Ready],
        );
        assert!(probe.check().await.is_transient());
        assert!(probe.check().await.is_ready());
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test]
    async fn test_scripted_probe_repeats_last() {
        let probe = ScriptedProbe::new("db", vec![ProbeResult::transient("refused")]);
        for _ in 0..3 {
            assert!(probe.check().await.is_transient());
        }
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_is_ready() {
        let probe = ScriptedProbe::new("db", Vec::new());
        assert!(probe.check().await.is_ready());
    }
}
