//! TCP connect probe.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::{Probe, classify};
use crate::domain::ProbeResult;

/// Ready once `host:port` accepts a TCP connection
#[derive(Debug, Clone)]
pub struct TcpProbe {
    name: String,
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16, connect_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            connect_timeout,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self) -> ProbeResult {
        let address = self.address();
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(_stream)) => ProbeResult::Ready,
            Ok(Err(e)) => classify::io_error(&e).with_context(&address),
            Err(_) => ProbeResult::transient(format!(
                "{}: connect timed out after {}ms",
                address,
                self.connect_timeout.as_millis()
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
