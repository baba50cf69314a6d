use crate::db::{lock_db, Database};
use crate::error::AppError;
use crate::models::{Settings, SettingsUpdate, Theme};
use crate::validation::validate_redirection_url;
use chrono::{DateTime, Utc};
use log::info;
use std::sync::{Arc, Mutex};

/// Read the settings, creating the defaults on first use.
pub fn get_settings(db: &Arc<Mutex<Database>>, now: DateTime<Utc>) -> Result<Settings, AppError> {
    let db = lock_db(db, "get settings");
    Ok(Settings::get_or_create(db.connection(), now)?)
}

/// Merge a partial update. A redirect URL, when present, is validated first.
pub fn update_settings(
    db: &Arc<Mutex<Database>>,
    update: SettingsUpdate,
    now: DateTime<Utc>,
) -> Result<Settings, AppError> {
    let update = SettingsUpdate {
        custom_redirection_url: update
            .custom_redirection_url
            .as_deref()
            .map(validate_redirection_url)
            .transpose()?,
        ..update
    };

    let db = lock_db(db, "update settings");
    let settings = Settings::update(db.connection(), &update, now)?;
    info!(
        "Settings updated: theme={}, redirect={}",
        settings.theme.as_str(),
        settings.custom_redirection_url
    );
    Ok(settings)
}

pub fn update_theme(db: &Arc<Mutex<Database>>, theme: Theme, now: DateTime<Utc>) -> Result<Settings, AppError> {
    update_settings(db, SettingsUpdate { theme: Some(theme), ..SettingsUpdate::default() }, now)
}

pub fn update_redirection_url(
    db: &Arc<Mutex<Database>>,
    url: &str,
    now: DateTime<Utc>,
) -> Result<Settings, AppError> {
    update_settings(
        db,
        SettingsUpdate { custom_redirection_url: Some(url.to_string()), ..SettingsUpdate::default() },
        now,
    )
}

/// Restore the default theme and redirect URL.
pub fn reset_settings(db: &Arc<Mutex<Database>>, now: DateTime<Utc>) -> Result<Settings, AppError> {
    update_settings(db, SettingsUpdate::defaults(), now)
}
