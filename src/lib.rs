//! Blockie: a local website and keyword blocker.
//!
//! The library holds the record store, the navigation gatekeeper and the
//! commands behind the extension's options page and popup. The
//! `blockie-native-host` binary exposes them over Chrome native messaging.

pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod gatekeeper;
pub mod matcher;
pub mod models;
pub mod native_host;
pub mod normalize;
pub mod pause;
pub mod validation;

#[cfg(test)]
mod test_utils;

use db::{migrations, Database};
use error::InitError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Open the database at `path` and bring its schema up to date.
pub fn open_database(path: &Path) -> Result<Arc<Mutex<Database>>, InitError> {
    let db = Database::open(path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    Ok(Arc::new(Mutex::new(db)))
}
