use super::schema::MIGRATIONS;
use log::info;
use rusqlite::{Connection, OptionalExtension, Result};

/// Bring the database up to the latest schema version.
///
/// Each migration runs at most once; re-running is a no-op.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);",
    )?;

    let current = current_version(conn)?;

    for (version, sql) in (1_i64..).zip(MIGRATIONS.iter()) {
        if version <= current {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        info!("Applied schema migration v{version}");
    }

    Ok(())
}

/// Current schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}
