//! HTTP health endpoint probe.

use std::error::Error as _;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{Probe, classify};
use crate::domain::ProbeResult;
use crate::error::{DepwaitError, Result};

/// Ready once a GET on the URL answers with a 2xx status
#[derive(Debug, Clone)]
pub struct HttpProbe {
    name: String,
    url: String,
    client: Client,
}

impl HttpProbe {
    /// Create a probe; `timeout` bounds each whole request
    pub fn new(name: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DepwaitError::invalid_target(&url, format!("http client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            url,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Classify a response status
pub fn classify_status(status: StatusCode) -> ProbeResult {
    if status.is_success() {
        ProbeResult::Ready
    } else if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        ProbeResult::transient(format!("HTTP {}", status))
    } else {
        ProbeResult::fatal(format!("HTTP {}", status))
    }
}

/// Error text without the URL, which `with_context` adds back
fn describe(err: &reqwest::Error) -> String {
    let mut parts = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    if parts.is_empty() {
        err.to_string()
    } else {
        parts.join(": ")
    }
}

fn io_source(err: &reqwest::Error) -> Option<&io::Error> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        source = cause.source();
    }
    None
}

fn classify_error(err: &reqwest::Error) -> ProbeResult {
    let reason = describe(err);

    if err.is_builder() || err.is_redirect() {
        return ProbeResult::fatal(reason);
    }

    // A server that is still starting may accept and then drop the connection
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        return ProbeResult::transient(reason);
    }

    match io_source(err).map(classify::io_error) {
        Some(ProbeResult::FatalFailure(_)) => ProbeResult::fatal(reason),
        Some(_) => ProbeResult::transient(reason),
        None => classify::message(reason),
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> ProbeResult {
        let result = match self.client.get(&self.url).send().await {
            Ok(response) => classify_status(response.status()),
            Err(e) => classify_error(&e),
        };
        result.with_context(&self.url)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
