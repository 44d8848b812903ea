//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Breathing session history
//! - Key-value store for presets and audio settings (JSON payloads)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::session::SessionSummary;

/// One finished (or stopped) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: DateTime<Utc>,
    /// `"inhale-hold-exhale"`
    pub pattern: String,
    /// Completed sets.
    pub sets: u32,
    /// Session duration in seconds.
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_name: Option<String>,
}

impl SessionRecord {
    pub fn from_summary(
        summary: &SessionSummary,
        preset_name: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            date: at,
            pattern: summary.config.pattern(),
            sets: summary.completed_sets,
            duration: summary.elapsed_seconds,
            preset_name,
        }
    }
}

/// SQLite database for local storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/breathwork.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("breathwork.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    date        TEXT NOT NULL,
                    pattern     TEXT NOT NULL,
                    sets        INTEGER NOT NULL,
                    duration    INTEGER NOT NULL,
                    preset_name TEXT
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert a record and keep only the newest `keep` rows, atomically.
    pub fn insert_record(&self, record: &SessionRecord, keep: usize) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO sessions (date, pattern, sets, duration, preset_name)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.date.to_rfc3339(),
                record.pattern,
                record.sets,
                record.duration,
                record.preset_name,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "DELETE FROM sessions WHERE id NOT IN (
                SELECT id FROM sessions ORDER BY id DESC LIMIT ?1
             )",
            params![keep as i64],
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// Newest first. Rows with an unreadable date are skipped.
    pub fn list_records(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, pattern, sets, duration, preset_name
             FROM sessions
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (date, pattern, sets, duration, preset_name) = row?;
            match DateTime::parse_from_rfc3339(&date) {
                Ok(date) => records.push(SessionRecord {
                    date: date.with_timezone(&Utc),
                    pattern,
                    sets,
                    duration,
                    preset_name,
                }),
                Err(e) => tracing::warn!(%date, "skipping history row with bad date: {e}"),
            }
        }
        Ok(records)
    }

    pub fn clear_records(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM sessions", [])?)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
