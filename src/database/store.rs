use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::database::schema::SCHEMA;

/// Handle to the file-backed catalog database.
///
/// Only the location is shared. Each caller opens its own connection with
/// [`Database::open`] and the connection is closed when it is dropped.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the database file and its tables if they are absent.
    /// Run once at process start.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory {:?}", parent))?;
            }
        }

        let conn = self.open().context("Failed to open database")?;
        conn.execute_batch(SCHEMA).context("Failed to initialize schema")?;
        info!("Catalog database ready at {:?}", self.path);
        Ok(())
    }

    pub fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_parent_and_tables() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Database::new(dir.path().join("db").join("catalog.sqlite3"));

        db.initialize()?;
        // Applying the schema twice is a no-op.
        db.initialize()?;

        let conn = db.open()?;
        let tables: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name IN ('category', 'items')
                 ORDER BY name",
            )?
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        assert_eq!(tables, vec!["category".to_string(), "items".to_string()]);
        Ok(())
    }

    #[test]
    fn test_open_enables_foreign_keys() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Database::new(dir.path().join("catalog.sqlite3"));
        db.initialize()?;

        let conn = db.open()?;
        let enabled: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        assert_eq!(enabled, 1);
        Ok(())
    }
}
