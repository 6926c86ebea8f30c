//! SQLite database probe.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, OpenFlags};

use super::{Probe, classify};
use crate::domain::ProbeResult;

/// Ready once the database file exists, opens, and answers a schema query
#[derive(Debug, Clone)]
pub struct SqliteProbe {
    name: String,
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteProbe {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn classify_error(err: &rusqlite::Error) -> ProbeResult {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen | ErrorCode::SystemIoFailure => {
                ProbeResult::transient(err.to_string())
            }
            ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::PermissionDenied
            | ErrorCode::AuthorizationForStatementDenied
            | ErrorCode::ReadOnly => ProbeResult::fatal(err.to_string()),
            _ => classify::message(err.to_string()),
        },
        _ => classify::message(err.to_string()),
    }
}

fn check_blocking(path: &Path, busy_timeout: Duration) -> ProbeResult {
    if !path.exists() {
        return ProbeResult::transient("database file does not exist yet");
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(e) => return classify_error(&e),
    };

    if let Err(e) = conn.busy_timeout(busy_timeout) {
        return classify_error(&e);
    }

    // Reading the schema forces SQLite to validate the file header
    match conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0)) {
        Ok(_) => ProbeResult::Ready,
        Err(e) => classify_error(&e),
    }
}

#[async_trait]
impl Probe for SqliteProbe {
    async fn check(&self) -> ProbeResult {
        let path = self.path.clone();
        let busy_timeout = self.busy_timeout;

        let result = match tokio::task::spawn_blocking(move || check_blocking(&path, busy_timeout)).await {
            Ok(result) => result,
            Err(e) => ProbeResult::fatal(format!("probe task failed: {}", e)),
        };
        result.with_context(self.path.display())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
