use rusqlite::{params, Connection};
use tracing::debug;

/// Maps category names to their stable ids.
pub struct CategoryRegistry<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryRegistry<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Returns the id for `name`, inserting a new row on first use.
    ///
    /// The insert is duplicate tolerant, so two callers racing on a new name
    /// both end up with the single row that won.
    pub fn resolve_or_create(&self, name: &str) -> rusqlite::Result<i64> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO category (name) VALUES (?1)", params![name])?;
        if inserted > 0 {
            debug!("Created category {:?}", name);
        }

        self.conn.query_row(
            "SELECT id FROM category WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
    }
}
