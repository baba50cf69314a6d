use crate::constants::{DEFAULT_REDIRECTION_URL, SETTINGS_ID};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

impl ToSql for Theme {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Theme {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Theme::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown theme '{s}'").into()))
    }
}

/// The singleton settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub theme: Theme,
    pub custom_redirection_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields to merge into the stored settings; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub custom_redirection_url: Option<String>,
}

impl SettingsUpdate {
    /// The update that restores factory defaults.
    pub fn defaults() -> Self {
        Self {
            theme: Some(Theme::System),
            custom_redirection_url: Some(DEFAULT_REDIRECTION_URL.to_string()),
        }
    }
}

impl Settings {
    fn defaults(now: DateTime<Utc>) -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            theme: Theme::System,
            custom_redirection_url: DEFAULT_REDIRECTION_URL.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            theme: row.get(1)?,
            custom_redirection_url: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    pub fn find(conn: &Connection) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, theme, custom_redirection_url, created_at, updated_at
             FROM settings WHERE id = ?1",
            params![SETTINGS_ID],
            Self::from_row,
        )
        .optional()
    }

    /// Read the settings, creating the default record on first use.
    ///
    /// `INSERT OR IGNORE` keeps two first readers from racing into a
    /// constraint error.
    pub fn get_or_create(conn: &Connection, now: DateTime<Utc>) -> Result<Self> {
        if let Some(settings) = Self::find(conn)? {
            return Ok(settings);
        }

        let defaults = Self::defaults(now);
        conn.execute(
            "INSERT OR IGNORE INTO settings (id, theme, custom_redirection_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                defaults.id,
                defaults.theme,
                defaults.custom_redirection_url,
                defaults.created_at,
                defaults.updated_at,
            ],
        )?;

        Ok(Self::find(conn)?.unwrap_or(defaults))
    }

    /// Merge `update` into the stored record and bump `updated_at`.
    pub fn update(conn: &Connection, update: &SettingsUpdate, now: DateTime<Utc>) -> Result<Self> {
        let current = Self::get_or_create(conn, now)?;

        let merged = Self {
            theme: update.theme.unwrap_or(current.theme),
            custom_redirection_url: update
                .custom_redirection_url
                .clone()
                .unwrap_or(current.custom_redirection_url),
            updated_at: now,
            ..current
        };

        conn.execute(
            "UPDATE settings SET theme = ?1, custom_redirection_url = ?2, updated_at = ?3 WHERE id = ?4",
            params![merged.theme, merged.custom_redirection_url, merged.updated_at, merged.id],
        )?;

        Ok(merged)
    }
}
