use crate::constants::DEFAULT_SCHEME_PREFIX;
use crate::db::{lock_db, Database};
use crate::error::{map_insert_error, AppError};
use crate::matcher::host_matches;
use crate::models::BlockedSite;
use crate::normalize::normalize;
use crate::validation::validate_site_url;
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use url::Url;

/// Popup view of the current tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCheck {
    pub hostname: String,
    pub blocked: bool,
    pub site: Option<BlockedSite>,
}

/// Find a stored site whose normalized host equals `hostname`, skipping `exclude_id`.
fn find_duplicate(
    conn: &Connection,
    hostname: &str,
    exclude_id: Option<&str>,
) -> rusqlite::Result<Option<BlockedSite>> {
    Ok(BlockedSite::find_all(conn)?
        .into_iter()
        .find(|s| Some(s.id.as_str()) != exclude_id && normalize(&s.url) == hostname))
}

/// List blocked sites, newest first, optionally filtered by a case-insensitive
/// substring of the stored url.
pub fn list_sites(db: &Arc<Mutex<Database>>, search: Option<&str>) -> Result<Vec<BlockedSite>, AppError> {
    let db = lock_db(db, "list sites");
    let sites = BlockedSite::find_all(db.connection())?;

    let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(sites);
    };
    let term = term.to_lowercase();
    Ok(sites
        .into_iter()
        .filter(|s| s.url.to_lowercase().contains(&term))
        .collect())
}

/// Add a site from the options form. Input without a scheme is stored with
/// `https://` in front.
pub fn add_site(db: &Arc<Mutex<Database>>, url: &str, now: DateTime<Utc>) -> Result<BlockedSite, AppError> {
    let url = validate_site_url(url)?;
    let stored = if url.to_ascii_lowercase().starts_with("http") {
        url.to_string()
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{url}")
    };
    let hostname = normalize(&stored);

    let db = lock_db(db, "add site");
    let conn = db.connection();

    if find_duplicate(conn, &hostname, None)?.is_some() {
        return Err(AppError::AlreadyExists { name: hostname });
    }

    let site = BlockedSite::new(&stored, now);
    site.insert(conn).map_err(|e| map_insert_error(e, &site.id))?;
    info!("Blocked site {hostname}");
    Ok(site)
}

/// Change the url of an existing site. The new host must not collide with
/// any other entry.
pub fn update_site(db: &Arc<Mutex<Database>>, id: &str, url: &str) -> Result<BlockedSite, AppError> {
    let url = validate_site_url(url)?;
    let hostname = normalize(url);

    let db = lock_db(db, "update site");
    let conn = db.connection();

    let existing = BlockedSite::find_by_id(conn, id)?
        .ok_or(AppError::NotFound { entity: "Blocked site" })?;

    if find_duplicate(conn, &hostname, Some(id))?.is_some() {
        return Err(AppError::AlreadyExists { name: hostname });
    }

    if !BlockedSite::update_url(conn, id, url)? {
        return Err(AppError::NotFound { entity: "Blocked site" });
    }
    Ok(BlockedSite { url: url.to_string(), ..existing })
}

pub fn delete_site(db: &Arc<Mutex<Database>>, id: &str) -> Result<(), AppError> {
    let db = lock_db(db, "delete site");
    if !BlockedSite::delete(db.connection(), id)? {
        return Err(AppError::NotFound { entity: "Blocked site" });
    }
    info!("Unblocked site {id}");
    Ok(())
}

/// Whether the page at `tab_url` is covered by a blocked site entry.
pub fn check_site(db: &Arc<Mutex<Database>>, tab_url: &str) -> Result<SiteCheck, AppError> {
    let hostname = blockable_host(tab_url)?;

    let db = lock_db(db, "check site");
    let site = BlockedSite::find_all(db.connection())?
        .into_iter()
        .find(|s| host_matches(&hostname, &normalize(&s.url)));

    Ok(SiteCheck { hostname, blocked: site.is_some(), site })
}

/// Block the host of the current tab from the popup. The bare hostname is
/// stored.
pub fn block_current_site(
    db: &Arc<Mutex<Database>>,
    tab_url: &str,
    now: DateTime<Utc>,
) -> Result<BlockedSite, AppError> {
    let hostname = blockable_host(tab_url)?;

    let db = lock_db(db, "block current site");
    let conn = db.connection();

    if find_duplicate(conn, &hostname, None)?.is_some() {
        return Err(AppError::AlreadyExists { name: hostname });
    }

    let site = BlockedSite::new(&hostname, now);
    site.insert(conn).map_err(|e| map_insert_error(e, &site.id))?;
    info!("Blocked site {hostname} from popup");
    Ok(site)
}

/// Hostname of a tab URL, or an error for pages that cannot be blocked
/// (browser-internal schemes, missing host).
fn blockable_host(tab_url: &str) -> Result<String, AppError> {
    let err = || AppError::InvalidInput {
        field: "url",
        reason: "this page cannot be blocked".into(),
    };

    let url = Url::parse(tab_url).map_err(|_| err())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(err());
    }
    Ok(normalize(url.as_str()))
}
