//! SQLite record store bootstrap, recovery and schema migrations.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the MedTrack core.
//! - Apply schema migrations in deterministic order.
//! - Recover from an unusable store file by recreating it once.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write records before migrations succeed.
//! - A store that fails to open twice is reported as `Unrecoverable`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_store, open_with_recovery};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Both the first open and the retry after deleting the store failed.
    Unrecoverable {
        path: PathBuf,
        first: Box<DbError>,
        retry: Box<DbError>,
    },
}

impl DbError {
    /// Returns whether the process must stop using the store location.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unrecoverable { .. })
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Unrecoverable { path, first, retry } => write!(
                f,
                "store at `{}` is unrecoverable: open failed ({first}) and retry after reset failed ({retry})",
                path.display()
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Unrecoverable { retry, .. } => Some(retry.as_ref()),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
