use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::Cli;
use depwait::cancel::CancelSignal;
use depwait::config::Config;
use depwait::domain::{FailureKind, ProbeResult, WaitOutcome};
use depwait::report::Summary;
use depwait::runner::{Dependency, wait_for_all};
use depwait::waiter::{AttemptEvent, ReadinessWaiter};

fn setup_logging() -> Result<PathBuf> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("depwait")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("depwait.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Without RUST_LOG the filter stays open and `log::max_level` decides
    let env = env_logger::Env::default().default_filter_or("trace");
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(log_file)
}

/// Apply the configured level once the config is known; RUST_LOG still wins
fn apply_log_level(level: Option<&str>) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(level) = level {
        match level.parse::<LevelFilter>() {
            Ok(filter) => log::set_max_level(filter),
            Err(_) => warn!("Unknown log level '{}', keeping info", level),
        }
    }
}

fn print_attempt(event: &AttemptEvent) {
    match &event.result {
        ProbeResult::Ready => {
            println!("  {} {} (attempt {})", "ready".green(), event.dependency, event.attempt);
        }
        ProbeResult::TransientFailure(reason) => match event.next_delay {
            Some(delay) => println!(
                "  {} {} (attempt {}/{}): {}, retrying in {:?}",
                "waiting".yellow(),
                event.dependency,
                event.attempt,
                event.max_attempts,
                reason,
                delay
            ),
            None => println!(
                "  {} {} (attempt {}/{}): {}",
                "unavailable".red(),
                event.dependency,
                event.attempt,
                event.max_attempts,
                reason
            ),
        },
        ProbeResult::FatalFailure(reason) => {
            println!(
                "  {} {} (attempt {}): {}",
                "rejected".red().bold(),
                event.dependency,
                event.attempt,
                reason
            );
        }
    }
}

fn print_summary(summary: &Summary) {
    for report in &summary.dependencies {
        let status = match &report.outcome {
            WaitOutcome::Succeeded { .. } => "ready".green(),
            WaitOutcome::Failed {
                kind: FailureKind::Exhausted,
                ..
            } => "unavailable".red(),
            WaitOutcome::Failed {
                kind: FailureKind::Rejected,
                ..
            } => "rejected".red().bold(),
            WaitOutcome::Cancelled { .. } => "cancelled".yellow(),
        };
        if report.dependency == report.target {
            println!("{} {}: {}", status, report.dependency, report.outcome);
        } else {
            println!("{} {} ({}): {}", status, report.dependency, report.target, report.outcome);
        }
    }

    if summary.ready {
        println!("{}", "All dependencies ready".green().bold());
    }
}

fn spawn_interrupt_handler(cancel: CancelSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling wait");
            cancel.cancel();
        }
    });
}

async fn run_application(cli: &Cli, config: &Config) -> Result<Summary> {
    info!("Starting application");

    let targets = cli.resolve_targets(config).context("Invalid dependency target")?;
    if targets.is_empty() {
        eyre::bail!("No dependencies to wait for: pass targets as arguments or list them under `dependencies` in the config file");
    }

    let settings = config.probe.to_settings();
    let dependencies = targets
        .into_iter()
        .map(|target| Dependency::from_target(target, &settings))
        .collect::<depwait::Result<Vec<_>>>()
        .context("Failed to build probes")?;

    let policy = config.retry.to_policy();
    info!(
        "Waiting for {} dependencies (max attempts: {}, delay: {:?})",
        dependencies.len(),
        policy.max_attempts,
        policy.delay
    );

    let cancel = CancelSignal::new();
    spawn_interrupt_handler(cancel.clone());

    let mut waiter = ReadinessWaiter::new().with_cancel(cancel);
    if !cli.json {
        let names: Vec<&str> = dependencies.iter().map(|d| d.name.as_str()).collect();
        println!("{} {}", "Waiting for:".cyan(), names.join(", "));
        if cli.is_verbose() {
            waiter = waiter.with_observer(print_attempt);
        }
    }

    let reports = wait_for_all(dependencies, Arc::new(waiter), &policy).await;
    let summary = Summary::new(reports);

    if cli.json {
        println!("{}", summary.to_json()?);
    } else {
        print_summary(&summary);
    }

    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    setup_logging().context("Failed to setup logging")?;

    // Load configuration, then let flags override it
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    apply_log_level(config.log_level.as_deref());
    info!("Starting with config from: {:?}", cli.config);

    let summary = run_application(&cli, &config).await.context("Application failed")?;

    info!("Finished with exit code {}", summary.exit_code);
    std::process::exit(summary.exit_code);
}
