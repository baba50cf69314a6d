pub mod helpers;
pub mod migrations;
pub mod schema;
pub use helpers::lock_db;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::time::Duration;

/// How long a statement waits on a lock held by another host process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
