// src/db/helpers.rs

use crate::db::Database;
use log::warn;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock the shared database, recovering from poisoning if necessary.
///
/// A panic in one handler must not take the blocker down with it, so a
/// poisoned guard is logged and reused.
pub fn lock_db<'a>(db: &'a Arc<Mutex<Database>>, context: &str) -> MutexGuard<'a, Database> {
    match db.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context}: database mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
