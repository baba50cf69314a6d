//! Host configuration resolved from the environment.

use crate::error::InitError;
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};

/// Overrides the database location.
pub const DB_PATH_ENV: &str = "BLOCKIE_DB_PATH";

/// `env_logger` filter directives for the host.
pub const LOG_ENV: &str = "BLOCKIE_LOG";

pub const DEFAULT_LOG_FILTER: &str = "info";

const DB_FILE_NAME: &str = "blockie.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Explicit database path; `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
    pub log_filter: String,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self {
            db_path: env::var_os(DB_PATH_ENV)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            log_filter: env::var(LOG_ENV)
                .ok()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Resolve the database path and create its parent directory.
    pub fn resolve_db_path(&self) -> Result<PathBuf, InitError> {
        let path = match &self.db_path {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(InitError::DataDirCreation)?;
        }
        Ok(path)
    }
}

fn default_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs = ProjectDirs::from("com", "blockie", "Blockie").ok_or(InitError::NoProjectDirs)?;
    Ok(data_file(proj_dirs.data_dir()))
}

fn data_file(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

/// Install the logger. Output goes to stderr because stdout carries the
/// native messaging protocol.
pub fn init_logging(filter: &str) {
    let result = env_logger::Builder::new()
        .parse_filters(filter)
        .target(env_logger::Target::Stderr)
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
