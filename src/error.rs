use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("'{name}' already exists")]
    AlreadyExists { name: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while bringing up the native host.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Could not create data directory: {0}")]
    DataDirCreation(#[source] std::io::Error),

    #[error("Failed to open database: {0}")]
    DatabaseOpen(#[source] rusqlite::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(#[source] rusqlite::Error),
}

/// Check if a rusqlite error is a UNIQUE / PRIMARY KEY constraint violation
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.code == rusqlite::ffi::ErrorCode::ConstraintViolation)
}

/// Map an insert failure to `AlreadyExists` when the id was taken.
pub(crate) fn map_insert_error(e: rusqlite::Error, name: &str) -> AppError {
    if is_unique_violation(&e) {
        AppError::AlreadyExists { name: name.to_string() }
    } else {
        AppError::Database(e)
    }
}
