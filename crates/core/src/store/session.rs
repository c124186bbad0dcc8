//! The owned database handle for one run.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::record::ContentRecord;

use super::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contents (
    id INTEGER PRIMARY KEY CHECK (id > 0),
    title TEXT,
    author TEXT,
    cover TEXT,
    genre TEXT,
    views INTEGER CHECK (views >= 0),
    rating INTEGER CHECK (rating BETWEEN 0 AND 5),
    currentEp INTEGER,
    schedule TEXT,
    startDate TEXT,
    revisit INTEGER NOT NULL DEFAULT 0
);
"#;

/// A connection to the content store, opened once per run.
///
/// Writes go through [`upsert_records`](super::upsert_records) and
/// [`mark_revisit`](super::mark_revisit), which take the session by `&mut`.
/// Dropping the session releases the handle; [`close`](Self::close) does the
/// same but reports errors.
#[derive(Debug)]
pub struct PersistenceSession {
    pub(crate) conn: Connection,
}

impl PersistenceSession {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::initialize_schema(&conn)?;
        debug!("Opened content store {:?}", path);
        Ok(Self { conn })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Release the handle.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_, e)| StoreError::Database(e.to_string()))
    }

    /// Fetch a stored record.
    pub fn get(&self, id: i64) -> Result<Option<ContentRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT id, title, author, cover, genre, views, rating, currentEp, schedule, startDate, revisit
                 FROM contents WHERE id = ?",
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of records flagged for revisit.
    pub fn revisit_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM contents WHERE revisit = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Whether `id` is stored and flagged for revisit.
    pub fn is_revisit(&self, id: i64) -> Result<bool, StoreError> {
        let flag: Option<bool> = self
            .conn
            .query_row(
                "SELECT revisit FROM contents WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(false))
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ContentRecord> {
    let views: Option<i64> = row.get(5)?;
    Ok(ContentRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        cover: row.get(3)?,
        genre: row.get(4)?,
        views: views.map(|v| v.max(0) as u64),
        rating: row.get(6)?,
        current_ep: row.get(7)?,
        schedule: row.get(8)?,
        start_date: row.get(9)?,
        revisit: row.get(10)?,
    })
}
