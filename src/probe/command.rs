//! Shell command probe.
//!
//! Runs `sh -c <command>`; exit status 0 means ready. This is the escape
//! hatch for dependencies without a built-in probe (`pg_isready`,
//! `redis-cli ping`, ...).

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::Probe;
use crate::domain::ProbeResult;

/// Ready once the command exits successfully
#[derive(Debug, Clone)]
pub struct CommandProbe {
    name: String,
    command: String,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(name: impl Into<String>, command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            env: Vec::new(),
            timeout,
        }
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl Probe for CommandProbe {
    async fn check(&self) -> ProbeResult {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return ProbeResult::fatal(format!("failed to spawn '{}': {}", self.command, e)),
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => ProbeResult::Ready,
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let mut reason = format!("'{}' exited with {}", self.command, output.status);
                if !stderr.trim().is_empty() {
                    reason.push_str(&format!(": {}", stderr.trim()));
                }
                ProbeResult::transient(reason)
            }
            Ok(Err(e)) => ProbeResult::fatal(format!("'{}' error: {}", self.command, e)),
            Err(_) => ProbeResult::transient(format!(
                "'{}' timed out after {}ms",
                self.command,
                self.timeout.as_millis()
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
