use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::{params, Connection, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-boxed suspension of blocking.
///
/// Records are never deleted; an ended pause is kept with `is_active = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseState {
    pub id: String,
    pub start_time: DateTime<Utc>,
    /// Length in minutes; fractional values allowed (0.5 = 30 seconds).
    pub duration_minutes: f64,
    pub is_active: bool,
}

impl PauseState {
    pub fn new(start_time: DateTime<Utc>, duration_minutes: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            duration_minutes,
            is_active: true,
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_time: row.get(1)?,
            duration_minutes: row.get(2)?,
            is_active: row.get::<_, i32>(3)? != 0,
        })
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO pause_states (id, start_time, duration_minutes, is_active)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                self.id,
                self.start_time,
                self.duration_minutes,
                i32::from(self.is_active),
            ],
        )?;
        Ok(())
    }

    /// Every pause ever started, oldest first.
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, start_time, duration_minutes, is_active FROM pause_states ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    /// Mark a pause inactive. Returns false if no row matched.
    pub fn deactivate(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE pause_states SET is_active = 0 WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    /// When this pause runs out.
    ///
    /// `None` for durations that cannot be represented (negative, NaN,
    /// overflowing); such a pause is treated as already over.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let secs = std::time::Duration::try_from_secs_f64(self.duration_minutes * 60.0).ok()?;
        let delta = TimeDelta::from_std(secs).ok()?;
        self.start_time.checked_add_signed(delta)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time().map_or(true, |end| now >= end)
    }

    /// Whole seconds left before the pause ends, 0 once expired.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        self.end_time()
            .map_or(0, |end| (end - now).num_seconds().max(0))
    }
}
