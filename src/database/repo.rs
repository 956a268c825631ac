use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// One row of a catalog listing: an item joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: String,
    pub image: Option<String>,
}

/// A single item as returned by an id lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub category_id: i64,
    pub category: String,
    pub image: Option<String>,
}

const JOINED_SELECT: &str = "
    SELECT items.id, items.name, items.category_id, category.name, items.image
    FROM items INNER JOIN category ON items.category_id = category.id";

pub struct ItemRepo<'c> {
    conn: &'c Connection,
}

impl<'c> ItemRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Appends an item and returns its id. Fails if `category_id` does not
    /// reference an existing category.
    pub fn insert(
        &self,
        name: &str,
        category_id: i64,
        image: Option<&str>,
    ) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO items (name, category_id, image) VALUES (?1, ?2, ?3)",
            params![name, category_id, image],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_all(&self) -> rusqlite::Result<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(&format!("{JOINED_SELECT} ORDER BY items.rowid"))?;
        let rows = stmt.query_map([], |row| Ok(to_entry(row_to_item(row)?)))?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn find_by_id(&self, id: i64) -> rusqlite::Result<Option<Item>> {
        self.conn
            .query_row(
                &format!("{JOINED_SELECT} WHERE items.id = ?1"),
                params![id],
                row_to_item,
            )
            .optional()
    }

    /// Items whose name equals `keyword` exactly. No partial matching.
    pub fn search(&self, keyword: &str) -> rusqlite::Result<Vec<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOINED_SELECT} WHERE items.name = ?1 ORDER BY items.rowid"))?;
        let rows = stmt.query_map(params![keyword], |row| Ok(to_entry(row_to_item(row)?)))?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
        category: row.get(3)?,
        image: row.get(4)?,
    })
}

fn to_entry(item: Item) -> CatalogEntry {
    CatalogEntry {
        name: item.name,
        category: item.category,
        image: item.image,
    }
}
