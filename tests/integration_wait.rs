//! End-to-end wait cycles through the public API
//!
//! Uses real probes against local listeners and temporary SQLite files, and
//! a recording sleeper so no test actually waits out its delays.

use std::sync::Arc;
use std::time::Duration;

use depwait::config::Config;
use depwait::probe::ScriptedProbe;
use depwait::report::{EXIT_EXHAUSTED, EXIT_READY, EXIT_REJECTED, Summary};
use depwait::runner::{Dependency, wait_for_all};
use depwait::target::{ProbeSettings, Target};
use depwait::waiter::AttemptEvent;
use depwait::{ProbeResult, ReadinessWaiter, RecordingSleeper, RetryPolicy, WaitOutcome};
use tempfile::TempDir;
use tokio::net::TcpListener;

fn recording_waiter() -> (ReadinessWaiter<Arc<RecordingSleeper>>, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::new());
    (ReadinessWaiter::with_sleeper(Arc::clone(&sleeper)), sleeper)
}

/// Database answers on the first check: one probe, no sleep
#[tokio::test]
async fn test_database_ready_immediately() {
    let (waiter, sleeper) = recording_waiter();
    let probe = ScriptedProbe::new("default", vec![ProbeResult::Ready]);

    let outcome = waiter.wait(&probe, &RetryPolicy::new(10, Duration::from_secs(1))).await;

    assert_eq!(outcome, WaitOutcome::succeeded(1));
    assert_eq!(probe.calls(), 1);
    assert_eq!(sleeper.count(), 0);
}

/// Driver error once, framework error twice, then ready: four checks
#[tokio::test]
async fn test_database_becomes_ready_after_transient_errors() {
    let (waiter, sleeper) = recording_waiter();
    let probe = ScriptedProbe::new(
        "default",
        vec![
            ProbeResult::transient("could not connect to server: Connection refused"),
            ProbeResult::transient("the database system is starting up"),
            ProbeResult::transient("the database system is starting up"),
            ProbeResult::Ready,
        ],
    );

    let outcome = waiter.wait(&probe, &RetryPolicy::new(10, Duration::from_secs(1))).await;

    assert_eq!(outcome, WaitOutcome::succeeded(4));
    assert_eq!(probe.calls(), 4);
    assert_eq!(sleeper.count(), 3);
}

#[tokio::test]
async fn test_tcp_target_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let target: Target = format!("svc=127.0.0.1:{}", port).parse().unwrap();
    let dependency = Dependency::from_target(target, &ProbeSettings::default()).unwrap();
    let (waiter, _sleeper) = recording_waiter();

    let reports = wait_for_all(vec![dependency], Arc::new(waiter), &RetryPolicy::new(3, Duration::ZERO)).await;

    assert_eq!(reports[0].dependency, "svc");
    assert_eq!(reports[0].outcome, WaitOutcome::succeeded(1));
    assert_eq!(Summary::new(reports).exit_code, EXIT_READY);
}

#[tokio::test]
async fn test_tcp_target_exhausts_budget() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let target: Target = format!("tcp://127.0.0.1:{}", port).parse().unwrap();
    let dependency = Dependency::from_target(target, &ProbeSettings::default()).unwrap();
    let (waiter, sleeper) = recording_waiter();

    let reports = wait_for_all(
        vec![dependency],
        Arc::new(waiter),
        &RetryPolicy::new(3, Duration::from_millis(100)),
    )
    .await;

    let outcome = &reports[0].outcome;
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(outcome.failure_kind(), Some(depwait::FailureKind::Exhausted));
    assert!(outcome.reason().unwrap().contains(&port.to_string()));
    assert_eq!(sleeper.count(), 2);
    assert_eq!(Summary::new(reports).exit_code, EXIT_EXHAUSTED);
}

/// Config file lists a SQLite database that appears after the first check
#[tokio::test]
async fn test_config_file_sqlite_dependency() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("app.db");
    let config_path = dir.path().join("depwait.yml");
    std::fs::write(
        &config_path,
        format!(
            "retry:\n  max_attempts: 5\n  delay_ms: 250\ndependencies:\n  - name: db\n    target: sqlite://{}\n",
            db_path.display()
        ),
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    let settings = config.probe.to_settings();
    let dependencies: Vec<Dependency> = config
        .targets()
        .unwrap()
        .into_iter()
        .map(|t| Dependency::from_target(t, &settings).unwrap())
        .collect();

    let create_path = db_path.clone();
    let (waiter, sleeper) = recording_waiter();
    let waiter = waiter.with_observer(move |event: &AttemptEvent| {
        if event.attempt == 1 {
            let conn = rusqlite::Connection::open(&create_path).unwrap();
            conn.execute("CREATE TABLE migrations (id INTEGER PRIMARY KEY)", []).unwrap();
        }
    });

    let reports = wait_for_all(dependencies, Arc::new(waiter), &config.retry.to_policy()).await;

    assert_eq!(reports[0].dependency, "db");
    assert_eq!(reports[0].outcome, WaitOutcome::succeeded(2));
    assert_eq!(sleeper.calls(), vec![Duration::from_millis(250)]);
}

/// A rejected dependency is reported apart from one that ran out of attempts
#[tokio::test]
async fn test_rejection_and_exhaustion_stay_distinct() {
    let dependencies = vec![
        Dependency::new(
            "scripted",
            Box::new(ScriptedProbe::new("auth", vec![ProbeResult::fatal("password authentication failed")])),
        ),
        Dependency::new(
            "scripted",
            Box::new(ScriptedProbe::new("queue", vec![ProbeResult::transient("connection refused")])),
        ),
    ];
    let (waiter, _sleeper) = recording_waiter();

    let reports = wait_for_all(dependencies, Arc::new(waiter), &RetryPolicy::new(4, Duration::ZERO)).await;

    assert_eq!(reports[0].outcome, WaitOutcome::rejected(1, "password authentication failed"));
    assert_eq!(reports[1].outcome, WaitOutcome::exhausted(4, "connection refused"));

    let summary = Summary::new(reports);
    assert_eq!(summary.exit_code, EXIT_REJECTED);
    assert_eq!(summary.failed().count(), 2);
}

/// Two waits with identical policy and fresh probes give identical outcomes
#[tokio::test]
async fn test_repeated_waits_are_independent() {
    let (waiter, _sleeper) = recording_waiter();
    let policy = RetryPolicy::new(3, Duration::from_millis(10));
    let script = || vec![ProbeResult::transient("refused"), ProbeResult::Ready];

    let first = waiter.wait(&ScriptedProbe::new("db", script()), &policy).await;
    let second = waiter.wait(&ScriptedProbe::new("db", script()), &policy).await;

    assert_eq!(first, WaitOutcome::succeeded(2));
    assert_eq!(first, second);
}
