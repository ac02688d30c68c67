//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve the on-disk store location and the default log level.
//!
//! # Invariants
//! - An explicit, non-blank `MEDTRACK_DB_PATH` always wins.
//! - Resolution never fails; the temp dir is the last fallback.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Env var holding an explicit store file path.
pub const DB_PATH_ENV: &str = "MEDTRACK_DB_PATH";
/// Env var holding the log level override.
pub const LOG_LEVEL_ENV: &str = "MEDTRACK_LOG_LEVEL";
/// Store file name inside the application data directory.
pub const STORE_FILE_NAME: &str = "default.store";

const APP_DIR_NAME: &str = "medtrack";

/// Resolves the store file path.
///
/// Order: `MEDTRACK_DB_PATH`, then `<data dir>/medtrack/default.store`, then
/// `<temp dir>/medtrack/default.store`.
pub fn resolve_store_path() -> PathBuf {
    store_path_from(std::env::var(DB_PATH_ENV).ok(), dirs::data_dir())
}

/// Resolves the log level from `MEDTRACK_LOG_LEVEL` or the build-mode default.
pub fn resolve_log_level() -> String {
    match std::env::var(LOG_LEVEL_ENV) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => default_log_level().to_string(),
    }
}

fn store_path_from(explicit: Option<String>, data_dir: Option<PathBuf>) -> PathBuf {
    if let Some(raw) = explicit {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    data_dir
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(STORE_FILE_NAME)
}
