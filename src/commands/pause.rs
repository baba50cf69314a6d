use crate::db::Database;
use crate::error::AppError;
use crate::models::PauseState;
use crate::pause::{PauseEvaluator, PauseStatus};
use crate::validation::validate_pause_minutes;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Suspend blocking for `duration_minutes`, replacing any running pause.
pub fn start_pause(
    db: &Arc<Mutex<Database>>,
    duration_minutes: f64,
    now: DateTime<Utc>,
) -> Result<PauseState, AppError> {
    let minutes = validate_pause_minutes(duration_minutes)?;
    Ok(PauseEvaluator::new(Arc::clone(db)).start_pause(now, minutes)?)
}

/// End the running pause. Returns false if blocking was not paused.
pub fn resume(db: &Arc<Mutex<Database>>) -> Result<bool, AppError> {
    Ok(PauseEvaluator::new(Arc::clone(db)).resume()?)
}

pub fn pause_status(db: &Arc<Mutex<Database>>, now: DateTime<Utc>) -> Result<PauseStatus, AppError> {
    Ok(PauseEvaluator::new(Arc::clone(db)).status(now)?)
}
