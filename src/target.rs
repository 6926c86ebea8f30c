//! Dependency target parsing.
//!
//! Accepted forms, each optionally prefixed with `name=`:
//! - `tcp://host:port` or bare `host:port`
//! - `postgres://…`, `postgresql://…`, `mysql://…`, `redis://…`, `amqp://…`
//!   (TCP check on the URL's host and port, default port per scheme)
//! - `http://…`, `https://…`
//! - `sqlite:///abs/path.db`, `sqlite://relative.db`
//! - `cmd:<shell command>`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DepwaitError, Result};
use crate::probe::{CommandProbe, HttpProbe, Probe, SqliteProbe, TcpProbe};

/// Settings applied to every probe built from a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Per-attempt connect/request/command timeout
    pub timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
        }
    }
}

/// What kind of check a target needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Tcp { host: String, port: u16 },
    Http { url: String },
    Sqlite { path: PathBuf },
    Command { command: String },
}

/// A named dependency to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
    raw: String,
}

/// Well-known service schemes checked with a TCP connect
const SERVICE_PORTS: &[(&str, u16)] = &[
    ("postgres", 5432),
    ("postgresql", 5432),
    ("mysql", 3306),
    ("mariadb", 3306),
    ("redis", 6379),
    ("amqp", 5672),
    ("mongodb", 27017),
];

impl Target {
    /// The target string without its name prefix
    pub fn spec(&self) -> &str {
        &self.raw
    }

    /// Rename the target
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Build the probe for this target
    pub fn into_probe(self, settings: &ProbeSettings) -> Result<Box<dyn Probe>> {
        let probe: Box<dyn Probe> = match self.kind {
            TargetKind::Tcp { host, port } => Box::new(TcpProbe::new(self.name, host, port, settings.timeout)),
            TargetKind::Http { url } => Box::new(HttpProbe::new(self.name, url, settings.timeout)?),
            TargetKind::Sqlite { path } => Box::new(SqliteProbe::new(self.name, path, settings.timeout)),
            TargetKind::Command { command } => Box::new(CommandProbe::new(self.name, command, settings.timeout)),
        };
        Ok(probe)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.raw {
            write!(f, "{}", self.raw)
        } else {
            write!(f, "{}={}", self.name, self.raw)
        }
    }
}

impl FromStr for Target {
    type Err = DepwaitError;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim();
        let (name, spec) = split_name(input);
        if spec.is_empty() {
            return Err(DepwaitError::invalid_target(input, "empty target"));
        }

        let kind = parse_kind(spec).map_err(|reason| DepwaitError::invalid_target(input, reason))?;
        Ok(Self {
            name: name.unwrap_or(spec).to_string(),
            kind,
            raw: spec.to_string(),
        })
    }
}

/// Split an optional `name=` prefix. Names are limited to `[A-Za-z0-9_.-]`,
/// so `=` inside commands or query strings is left alone.
fn split_name(input: &str) -> (Option<&str>, &str) {
    if let Some((name, rest)) = input.split_once('=')
        && !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return (Some(name), rest.trim());
    }
    (None, input)
}

fn parse_kind(spec: &str) -> std::result::Result<TargetKind, String> {
    if let Some(command) = spec.strip_prefix("cmd:") {
        let command = command.trim();
        if command.is_empty() {
            return Err("empty command".to_string());
        }
        return Ok(TargetKind::Command {
            command: command.to_string(),
        });
    }

    let Some((scheme, rest)) = spec.split_once("://") else {
        let (host, port) = parse_host_port(spec, None)?;
        return Ok(TargetKind::Tcp { host, port });
    };

    match scheme.to_ascii_lowercase().as_str() {
        "tcp" => {
            let (host, port) = parse_host_port(rest.trim_end_matches('/'), None)?;
            Ok(TargetKind::Tcp { host, port })
        }
        "http" | "https" => {
            if rest.is_empty() {
                return Err("missing host".to_string());
            }
            Ok(TargetKind::Http { url: spec.to_string() })
        }
        "sqlite" => {
            if rest.is_empty() {
                return Err("missing database path".to_string());
            }
            Ok(TargetKind::Sqlite {
                path: PathBuf::from(rest),
            })
        }
        other => match SERVICE_PORTS.iter().find(|(s, _)| *s == other) {
            Some((_, default_port)) => {
                let (host, port) = parse_host_port(authority(rest), Some(*default_port))?;
                Ok(TargetKind::Tcp { host, port })
            }
            None => Err(format!("unsupported scheme '{}'", scheme)),
        },
    }
}

/// Host and port part of a URL remainder: drops userinfo, path and query
fn authority(rest: &str) -> &str {
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    match authority.rsplit_once('@') {
        Some((_, host)) => host,
        None => authority,
    }
}

fn parse_host_port(input: &str, default_port: Option<u16>) -> std::result::Result<(String, u16), String> {
    // Bracketed IPv6: [::1]:5432
    if let Some(rest) = input.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or("unterminated '[' in host")?;
        let port = match after.strip_prefix(':') {
            Some(port) => parse_port(port)?,
            None if after.is_empty() => default_port.ok_or("missing port")?,
            None => return Err(format!("unexpected '{}' after host", after)),
        };
        return Ok((host.to_string(), port));
    }

    let (host, port) = match input.rsplit_once(':') {
        Some((host, port)) => (host, parse_port(port)?),
        None => (input, default_port.ok_or("missing port")?),
    };
    if host.is_empty() {
        return Err("missing host".to_string());
    }
    Ok((host.to_string(), port))
}

fn parse_port(port: &str) -> std::result::Result<u16, String> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("invalid port '{}'", port)),
        Ok(port) => Ok(port),
    }
}
