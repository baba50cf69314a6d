//! Pause window: temporary suspension of blocking, expired lazily on read.

use crate::db::{lock_db, Database};
use crate::models::PauseState;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Snapshot of the pause window for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseStatus {
    pub paused: bool,
    pub remaining_secs: Option<i64>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl PauseStatus {
    fn inactive() -> Self {
        Self { paused: false, remaining_secs: None, ends_at: None }
    }
}

/// Owns the pause window: whether blocking is currently suspended, and the
/// lazy expiry of a pause that has run out.
pub struct PauseEvaluator {
    db: Arc<Mutex<Database>>,
}

impl PauseEvaluator {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// True while a pause is running. An expired pause is marked inactive as a
    /// side effect.
    pub fn is_paused(&self, now: DateTime<Utc>) -> rusqlite::Result<bool> {
        Ok(self.status(now)?.paused)
    }

    pub fn status(&self, now: DateTime<Utc>) -> rusqlite::Result<PauseStatus> {
        let db = lock_db(&self.db, "PauseEvaluator");
        status_with(db.connection(), now)
    }

    /// Start a new pause of `duration_minutes`, superseding any running one.
    pub fn start_pause(&self, now: DateTime<Utc>, duration_minutes: f64) -> rusqlite::Result<PauseState> {
        let db = lock_db(&self.db, "PauseEvaluator");
        let conn = db.connection();

        let tx = conn.unchecked_transaction()?;
        deactivate_all_active(&tx)?;
        let pause = PauseState::new(now, duration_minutes);
        pause.insert(&tx)?;
        tx.commit()?;

        info!("Blocking paused for {duration_minutes} minutes");
        Ok(pause)
    }

    /// End the running pause now. Returns false if nothing was paused.
    pub fn resume(&self) -> rusqlite::Result<bool> {
        let db = lock_db(&self.db, "PauseEvaluator");
        let resumed = deactivate_all_active(db.connection())? > 0;
        if resumed {
            info!("Blocking resumed");
        }
        Ok(resumed)
    }
}

fn status_with(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<PauseStatus> {
    let pauses = PauseState::find_all(conn)?;
    let mut active = pauses.iter().filter(|p| p.is_active);

    let Some(pause) = active.next() else {
        return Ok(PauseStatus::inactive());
    };
    if active.next().is_some() {
        warn!("More than one active pause found; using {}", pause.id);
    }

    if pause.is_expired(now) {
        PauseState::deactivate(conn, &pause.id)?;
        info!("Pause {} expired, blocking resumes", pause.id);
        return Ok(PauseStatus::inactive());
    }

    Ok(PauseStatus {
        paused: true,
        remaining_secs: Some(pause.remaining_secs(now)),
        ends_at: pause.end_time(),
    })
}

fn deactivate_all_active(conn: &Connection) -> rusqlite::Result<usize> {
    let mut count = 0;
    for pause in PauseState::find_all(conn)?.iter().filter(|p| p.is_active) {
        if PauseState::deactivate(conn, &pause.id)? {
            count += 1;
        }
    }
    Ok(count)
}
