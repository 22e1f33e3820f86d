//! SQLite-backed event store.
//!
//! Two tables:
//! - `collections`: one row per named collection, holding the JSON array of
//!   records plus a monotonic revision counter bumped on every write. The
//!   revision feeds the polling fallback in [`crate::notify`].
//! - `kv`: derived/engine state (streak aggregates, the persisted session
//!   driver).

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;

use super::data_dir;
use super::store::EventStore;

/// SQLite database implementing [`EventStore`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/wellspring/wellspring.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("wellspring.db");
        let conn = Connection::open(&path).map_err(|source| StoreError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS collections (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    rev   INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

}

impl EventStore for Database {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM collections WHERE key = ?1")
            .map_err(StoreError::from)?;
        let result = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()
            .map_err(StoreError::from)?;
        Ok(result)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO collections (key, value, rev) VALUES (?1, ?2, 1)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, rev = rev + 1",
                params![key, value],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn revision(&self, key: &str) -> Result<u64, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT rev FROM collections WHERE key = ?1")
            .map_err(StoreError::from)?;
        let rev = stmt
            .query_row(params![key], |row| row.get::<_, u64>(0))
            .optional()
            .map_err(StoreError::from)?;
        Ok(rev.unwrap_or(0))
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(StoreError::from)?;
        let result = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()
            .map_err(StoreError::from)?;
        Ok(result)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_write_and_read() {
        let db = Database::open_memory().unwrap();
        assert!(db.read("mood:alice").unwrap().is_none());
        db.write("mood:alice", "[]").unwrap();
        assert_eq!(db.read("mood:alice").unwrap().unwrap(), "[]");
    }

    #[test]
    fn revision_bumps_on_every_write() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.revision("mood:alice").unwrap(), 0);
        db.write("mood:alice", "[]").unwrap();
        assert_eq!(db.revision("mood:alice").unwrap(), 1);
        db.write("mood:alice", "[1]").unwrap();
        assert_eq!(db.revision("mood:alice").unwrap(), 2);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let conn = Connection::open(&path).unwrap();
            let db = Database { conn };
            db.migrate().unwrap();
            db.write("habit:alice", r#"[{"x":1}]"#).unwrap();
        }
        let conn = Connection::open(&path).unwrap();
        let db = Database { conn };
        db.migrate().unwrap();
        assert_eq!(db.read("habit:alice").unwrap().unwrap(), r#"[{"x":1}]"#);
        assert_eq!(db.revision("habit:alice").unwrap(), 1);
    }
}
