//! SQLite-backed blob adapter.
//!
//! # Invariants
//! - One row per storage key in the `blobs` table.
//! - Connections opened here have passed `schema::ensure_schema`.

use super::{PersistResult, PersistenceAdapter};
use super::schema::{open_blob_db, open_blob_db_in_memory};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Storage key used by the original local-storage payload.
pub const DEFAULT_STORAGE_KEY: &str = "calendarData";

pub struct SqliteBlobAdapter {
    conn: Connection,
    key: String,
}

impl SqliteBlobAdapter {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> PersistResult<Self> {
        Ok(Self::new(open_blob_db(path)?, key))
    }

    pub fn open_in_memory(key: impl Into<String>) -> PersistResult<Self> {
        Ok(Self::new(open_blob_db_in_memory()?, key))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PersistenceAdapter for SqliteBlobAdapter {
    fn load_blob(&self) -> PersistResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT value FROM blobs WHERE key = ?1;",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn save_blob(&mut self, blob: &str) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO blobs (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key, blob],
        )?;

        debug!(
            "event=blob_save module=persist backend=sqlite status=ok key={} bytes={}",
            self.key,
            blob.len()
        );
        Ok(())
    }
}
