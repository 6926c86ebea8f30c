//! Configuration for depwait.
//!
//! Search order:
//! 1. Explicit path if provided
//! 2. ~/.config/depwait/depwait.yml (user config)
//! 3. ./depwait.yml (project config)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DepwaitError, Result};
use crate::policy::RetryPolicy;
use crate::target::{ProbeSettings, Target};

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default delay between attempts.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub retry: RetryConfig,
    pub probe: ProbeConfig,
    pub dependencies: Vec<DependencyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            retry: RetryConfig::default(),
            probe: ProbeConfig::default(),
            dependencies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub backoff_multiplier: Option<f64>,
    pub max_delay_ms: Option<u64>,
    /// Ignore `max_attempts` and retry until ready or cancelled
    pub unbounded: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
            backoff_multiplier: None,
            max_delay_ms: None,
            unbounded: false,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms));
        if let Some(multiplier) = self.backoff_multiplier {
            policy = policy.with_backoff(multiplier);
        }
        if let Some(max_delay_ms) = self.max_delay_ms {
            policy = policy.with_max_delay(Duration::from_millis(max_delay_ms));
        }
        if self.unbounded {
            policy = policy.unbounded();
        }
        policy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ProbeConfig {
    pub fn to_settings(&self) -> ProbeSettings {
        ProbeSettings {
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// A dependency listed in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub target: String,
}

impl DependencyConfig {
    pub fn to_target(&self) -> Result<Target> {
        let target: Target = self.target.parse()?;
        Ok(match &self.name {
            Some(name) => target.named(name),
            None => target,
        })
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_name = env!("CARGO_PKG_NAME");

        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config = Self::from_yaml(&content)?;

        log::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(m) = self.retry.backoff_multiplier
            && !(m.is_finite() && m > 0.0)
        {
            return Err(DepwaitError::Config(format!(
                "retry.backoff_multiplier must be a positive number, got {}",
                m
            )));
        }
        if self.probe.timeout_ms == 0 {
            return Err(DepwaitError::Config("probe.timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Parse every configured dependency
    pub fn targets(&self) -> Result<Vec<Target>> {
        self.dependencies.iter().map(DependencyConfig::to_target).collect()
    }
}
