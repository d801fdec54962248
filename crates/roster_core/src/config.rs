//! Process configuration read from the environment.
//!
//! | variable           | effect                                   |
//! |--------------------|------------------------------------------|
//! | `ROSTER_DB_PATH`   | SQLite file; unset means in-memory       |
//! | `ROSTER_LOG_LEVEL` | log level; unset means build default     |
//! | `ROSTER_LOG_DIR`   | log directory; unset disables logging    |
//!
//! Blank values count as unset.

use crate::db::{open_db, open_db_in_memory, DbResult, Gateway};
use crate::logging::{default_log_level, init_logging};
use std::env;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "ROSTER_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ROSTER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ROSTER_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl RosterConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR),
        }
    }

    pub fn logging_enabled(&self) -> bool {
        self.log_dir.is_some()
    }

    /// Starts file logging when a log directory is configured.
    pub fn init_logging(&self) -> Result<(), String> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir),
            None => Ok(()),
        }
    }

    /// Opens the configured database with migrations applied.
    pub fn open_gateway(&self) -> DbResult<Gateway> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}
