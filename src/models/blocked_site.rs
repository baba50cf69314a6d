use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A domain the user wants kept out of reach.
///
/// `url` is stored as entered (possibly without scheme); matching always goes
/// through [`crate::normalize::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSite {
    pub id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl BlockedSite {
    pub fn new(url: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            created_at,
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    /// Insert a new record. Fails if the id already exists.
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO blocked_sites (id, url, created_at) VALUES (?1, ?2, ?3)",
            params![self.id, self.url, self.created_at],
        )?;
        Ok(())
    }

    /// All sites, newest first.
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, url, created_at FROM blocked_sites ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT id, url, created_at FROM blocked_sites WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// Replace the url of an existing site. Returns false if no row matched.
    pub fn update_url(conn: &Connection, id: &str, url: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE blocked_sites SET url = ?1 WHERE id = ?2",
            params![url, id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM blocked_sites WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, setup_test_db};

    #[test]
    fn test_find_all_returns_empty_when_no_sites() {
        let (db, _dir) = setup_test_db();
        assert!(BlockedSite::find_all(db.connection()).unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_find_by_id() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let site = BlockedSite::new("https://reddit.com", at(0));
        site.insert(conn).unwrap();

        let found = BlockedSite::find_by_id(conn, &site.id).unwrap();
        assert_eq!(found, Some(site));
    }

    #[test]
    fn test_insert_duplicate_id_fails() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let site = BlockedSite::new("reddit.com", at(0));
        site.insert(conn).unwrap();

        let err = site.insert(conn).unwrap_err();
        assert!(crate::error::is_unique_violation(&err));
    }

    #[test]
    fn test_find_all_orders_newest_first() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        BlockedSite::new("old.com", at(0)).insert(conn).unwrap();
        BlockedSite::new("new.com", at(120)).insert(conn).unwrap();
        BlockedSite::new("mid.com", at(60)).insert(conn).unwrap();

        let urls: Vec<String> = BlockedSite::find_all(conn)
            .unwrap()
            .into_iter()
            .map(|s| s.url)
            .collect();
        assert_eq!(urls, vec!["new.com", "mid.com", "old.com"]);
    }

    #[test]
    fn test_update_url() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let site = BlockedSite::new("reddit.com", at(0));
        site.insert(conn).unwrap();

        assert!(BlockedSite::update_url(conn, &site.id, "https://news.ycombinator.com").unwrap());
        let found = BlockedSite::find_by_id(conn, &site.id).unwrap().unwrap();
        assert_eq!(found.url, "https://news.ycombinator.com");
        assert_eq!(found.created_at, site.created_at);
    }

    #[test]
    fn test_update_and_delete_missing_return_false() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        assert!(!BlockedSite::update_url(conn, "missing", "x.com").unwrap());
        assert!(!BlockedSite::delete(conn, "missing").unwrap());
    }

    #[test]
    fn test_delete() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let site = BlockedSite::new("reddit.com", at(0));
        site.insert(conn).unwrap();

        assert!(BlockedSite::delete(conn, &site.id).unwrap());
        assert!(BlockedSite::find_by_id(conn, &site.id).unwrap().is_none());
    }
}
