use crate::db::{lock_db, Database};
use crate::error::{map_insert_error, AppError};
use crate::models::BlockedWord;
use crate::validation::validate_word;
use chrono::{DateTime, Utc};
use log::info;
use std::sync::{Arc, Mutex};

/// List blocked words in insertion order, optionally filtered by substring.
pub fn list_words(db: &Arc<Mutex<Database>>, search: Option<&str>) -> Result<Vec<BlockedWord>, AppError> {
    let db = lock_db(db, "list words");
    let words = BlockedWord::find_all(db.connection())?;

    match search.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => {
            let term = term.to_lowercase();
            Ok(words.into_iter().filter(|w| w.word.contains(&term)).collect())
        }
        None => Ok(words),
    }
}

/// Add a blocked word. Words are stored lower-cased and must be unique
/// regardless of case.
pub fn add_word(db: &Arc<Mutex<Database>>, word: &str, now: DateTime<Utc>) -> Result<BlockedWord, AppError> {
    let word = validate_word(word)?.to_lowercase();

    let db = lock_db(db, "add word");
    let conn = db.connection();

    if BlockedWord::find_all(conn)?
        .iter()
        .any(|w| w.word.eq_ignore_ascii_case(&word))
    {
        return Err(AppError::AlreadyExists { name: word });
    }

    let blocked = BlockedWord::new(&word, now);
    blocked.insert(conn).map_err(|e| map_insert_error(e, &blocked.id))?;
    info!("Blocked word '{word}'");
    Ok(blocked)
}

pub fn delete_word(db: &Arc<Mutex<Database>>, id: &str) -> Result<(), AppError> {
    let db = lock_db(db, "delete word");
    if !BlockedWord::delete(db.connection(), id)? {
        return Err(AppError::NotFound { entity: "Blocked word" });
    }
    Ok(())
}
