//! Connection bootstrap and store recovery.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas and run migrations before handing out a
//!   connection.
//! - Reset an unusable store file and retry exactly once.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and all migrations applied.
//! - Recovery deletes the store file (and SQLite sidecars) between attempts.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info, warn};
use rusqlite::Connection;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");
    let result = Connection::open(path)
        .map_err(DbError::from)
        .and_then(bootstrap_connection);
    log_open_outcome("file", started_at, result)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");
    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(bootstrap_connection);
    log_open_outcome("memory", started_at, result)
}

/// Opens the application store at `path`, recreating it once on failure.
///
/// The parent directory is created when missing. A returned
/// [`DbError::Unrecoverable`] must be treated as fatal by the caller.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with_recovery(path.as_ref(), |store_path| {
        if let Some(parent) = store_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        open_db(store_path)
    })
}

/// Runs `open` against `path`; on failure deletes the store file and runs
/// `open` exactly one more time.
///
/// # Errors
/// - [`DbError::Unrecoverable`] carrying both failures when the retry fails.
pub fn open_with_recovery<T, F>(path: &Path, mut open: F) -> DbResult<T>
where
    F: FnMut(&Path) -> DbResult<T>,
{
    let first = match open(path) {
        Ok(handle) => return Ok(handle),
        Err(err) => err,
    };

    warn!(
        "event=store_recovery module=db status=start path={} error={}",
        path.display(),
        first
    );
    remove_store_files(path);

    match open(path) {
        Ok(handle) => {
            info!(
                "event=store_recovery module=db status=ok path={}",
                path.display()
            );
            Ok(handle)
        }
        Err(retry) => {
            error!(
                "event=store_recovery module=db status=error error_code=store_unrecoverable path={} error={}",
                path.display(),
                retry
            );
            Err(DbError::Unrecoverable {
                path: path.to_path_buf(),
                first: Box::new(first),
                retry: Box::new(retry),
            })
        }
    }
}

fn remove_store_files(path: &Path) {
    let mut targets = vec![path.to_path_buf()];
    targets.extend(SIDECAR_SUFFIXES.iter().map(|suffix| sidecar_path(path, suffix)));

    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => info!(
                "event=store_reset module=db status=ok removed={}",
                target.display()
            ),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            // The retry reports the real failure if the file is still in the way.
            Err(err) => warn!(
                "event=store_reset module=db status=error path={} error={}",
                target.display(),
                err
            ),
        }
    }
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn bootstrap_connection(mut conn: Connection) -> DbResult<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn log_open_outcome(
    mode: &str,
    started_at: Instant,
    result: DbResult<Connection>,
) -> DbResult<Connection> {
    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
