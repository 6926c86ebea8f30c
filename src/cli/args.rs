//! CLI argument definitions using clap.
//!
//! depwait is a single command: every flag is optional and overrides the
//! matching config file value.

use clap::Parser;
use std::path::PathBuf;

use depwait::config::Config;
use depwait::error::Result;
use depwait::target::Target;

/// depwait - block startup until dependencies accept connections
#[derive(Parser, Debug)]
#[command(name = "depwait")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dependencies to wait for: [name=]tcp://host:port, host:port,
    /// postgres://..., http(s)://..., sqlite:///path, cmd:<command>
    pub targets: Vec<String>,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print every probe attempt
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum probe attempts per dependency (0 means one)
    #[arg(short = 'n', long)]
    pub max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Multiply the delay by this factor after each failed attempt
    #[arg(short, long, value_parser = parse_multiplier)]
    pub backoff: Option<f64>,

    /// Upper bound for the delay when backing off, in milliseconds
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Per-attempt timeout in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Retry until ready or interrupted, ignoring the attempt limit
    #[arg(long, conflicts_with = "max_attempts")]
    pub forever: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_multiplier(value: &str) -> std::result::Result<f64, String> {
    let multiplier: f64 = value.parse().map_err(|e| format!("{}", e))?;
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(multiplier)
    } else {
        Err(format!("backoff must be a positive number, got {}", value))
    }
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Apply command-line overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
            config.retry.unbounded = false;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.retry.delay_ms = delay_ms;
        }
        if let Some(backoff) = self.backoff {
            config.retry.backoff_multiplier = Some(backoff);
        }
        if let Some(max_delay_ms) = self.max_delay_ms {
            config.retry.max_delay_ms = Some(max_delay_ms);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.probe.timeout_ms = timeout_ms.max(1);
        }
        if self.forever {
            config.retry.unbounded = true;
        }
    }

    /// Targets from the command line, or from the config when none were given
    pub fn resolve_targets(&self, config: &Config) -> Result<Vec<Target>> {
        if self.targets.is_empty() {
            return config.targets();
        }
        self.targets.iter().map(|t| t.parse()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use depwait::config::DependencyConfig;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["depwait"]).unwrap();
        assert!(cli.targets.is_empty());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(!cli.forever);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["depwait", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["depwait", "-c", "/path/to/depwait.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/depwait.yml")));
    }

    #[test]
    fn test_cli_targets() {
        let cli = Cli::try_parse_from(["depwait", "db=postgres://db:5432", "http://api/health"]).unwrap();
        assert_eq!(cli.targets, vec!["db=postgres://db:5432", "http://api/health"]);
    }

    #[test]
    fn test_cli_retry_flags() {
        let cli = Cli::try_parse_from([
            "depwait", "-n", "10", "-d", "500", "-b", "1.5", "--max-delay-ms", "8000", "-t", "2000", "db:5432",
        ])
        .unwrap();
        assert_eq!(cli.max_attempts, Some(10));
        assert_eq!(cli.delay_ms, Some(500));
        assert_eq!(cli.backoff, Some(1.5));
        assert_eq!(cli.max_delay_ms, Some(8000));
        assert_eq!(cli.timeout_ms, Some(2000));
    }

    #[test]
    fn test_backoff_must_be_positive() {
        assert!(Cli::try_parse_from(["depwait", "-b", "-1"]).is_err());
        assert!(Cli::try_parse_from(["depwait", "-b", "0"]).is_err());
        assert!(Cli::try_parse_from(["depwait", "-b", "nan"]).is_err());
        assert!(Cli::try_parse_from(["depwait", "-b", "inf"]).is_err());
        assert!(Cli::try_parse_from(["depwait", "-b", "fast"]).is_err());
    }

    #[test]
    fn test_overridden_config_still_validates() {
        let cli = Cli::try_parse_from(["depwait", "-b", "1.5"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_forever_conflicts_with_max_attempts() {
        let result = Cli::try_parse_from(["depwait", "--forever", "-n", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from(["depwait", "-n", "3", "-d", "10", "-b", "2", "-t", "0"]).unwrap();
        let mut config = Config::default();
        config.retry.unbounded = true;
        cli.apply_overrides(&mut config);

        assert_eq!(config.retry.max_attempts, 3);
        assert!(!config.retry.unbounded);
        assert_eq!(config.retry.delay_ms, 10);
        assert_eq!(config.retry.backoff_multiplier, Some(2.0));
        assert_eq!(config.probe.timeout_ms, 1);
    }

    #[test]
    fn test_apply_forever() {
        let cli = Cli::try_parse_from(["depwait", "--forever"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert!(config.retry.to_policy().max_attempts.is_unbounded());
    }

    #[test]
    fn test_resolve_targets_prefers_cli() {
        let cli = Cli::try_parse_from(["depwait", "cache=redis:6379"]).unwrap();
        let mut config = Config::default();
        config.dependencies.push(DependencyConfig {
            name: Some("db".into()),
            target: "db:5432".into(),
        });

        let targets = cli.resolve_targets(&config).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "cache");
    }

    #[test]
    fn test_resolve_targets_falls_back_to_config() {
        let cli = Cli::try_parse_from(["depwait"]).unwrap();
        let mut config = Config::default();
        config.dependencies.push(DependencyConfig {
            name: Some("db".into()),
            target: "db:5432".into(),
        });

        let targets = cli.resolve_targets(&config).unwrap();
        assert_eq!(targets[0].name, "db");
    }

    #[test]
    fn test_resolve_targets_invalid() {
        let cli = Cli::try_parse_from(["depwait", "ftp://files:21"]).unwrap();
        assert!(cli.resolve_targets(&Config::default()).is_err());
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["depwait", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
