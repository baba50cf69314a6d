use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A keyword that blocks any hostname containing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedWord {
    pub id: String,
    pub word: String,
    pub created_at: DateTime<Utc>,
}

impl BlockedWord {
    pub fn new(word: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            word: word.to_string(),
            created_at,
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO blocked_words (id, word, created_at) VALUES (?1, ?2, ?3)",
            params![self.id, self.word, self.created_at],
        )?;
        Ok(())
    }

    /// All words in the order they were added.
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, word, created_at FROM blocked_words ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM blocked_words WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
