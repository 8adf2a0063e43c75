//! SQLite persistence layer for contacts, companies, and notes.
//!
//! The database lives at `~/.rolodex/rolodex.db`. It is the single source of
//! truth: the webview holds nothing but the lists it last loaded and re-reads
//! after every mutation. One process, one connection, one writer.

use std::path::PathBuf;

use rusqlite::Connection;

pub mod types;
pub use types::*;

pub struct CrmDb {
    conn: Connection,
}

impl CrmDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database at `~/.rolodex/rolodex.db` and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Useful for testing.
    pub(crate) fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL keeps reads cheap while a write is in flight
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        // Enforce the companies/contacts/notes foreign keys from here on
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.rolodex/rolodex.db`.
    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".rolodex").join("rolodex.db"))
    }

    /// Probe for the existence of a row. Best-effort referential check at
    /// creation time; not a transactional guarantee against concurrent deletes.
    pub(crate) fn row_exists(&self, table: &'static str, id: i64) -> Result<bool, DbError> {
        let sql = match table {
            "contacts" => "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1)",
            "companies" => "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
            _ => unreachable!("unknown table {table}"),
        };
        Ok(self.conn.query_row(sql, [id], |row| row.get(0))?)
    }
}

pub mod companies;
pub mod contacts;
pub mod notes;

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::CrmDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the
    /// test. Test temp dirs are cleaned up by the OS.
    pub fn test_db() -> CrmDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        CrmDb::open_at(path).expect("Failed to open test database")
    }
}

// =============================================================================
// Tests
// =============================================================================
