//! Local SQLite store for the session token.
//!
//! The token is the only state the client keeps across restarts; every
//! clinical record lives on the backend.

mod schema;
mod tokens;

pub use schema::*;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

const BUSY_TIMEOUT_MS: u64 = 2_000;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt stored value in {column}: {message}")]
    Corrupt { column: &'static str, message: String },
}

pub type DbResult<T> = Result<T, DbError>;

/// Owns the SQLite connection; table access lives in per-table `impl` blocks.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the store at `path`, creating the file and table if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        // The UI shell and the core may hold the file at the same time
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        tracing::debug!(path = %path.display(), "Token store opened");
        Self::with_connection(conn)
    }

    /// In-memory store, lost on drop.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(tables, vec!["auth_tokens".to_string()]);
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");
        Database::open(&path).unwrap();
        assert!(Database::open(&path).is_ok());
    }
}
