//! Catalog service: validates submissions and ties the category registry,
//! the image store and the item store together.
//!
//! A submission moves through these stages, stopping at the first failure:
//!
//! 1. validate `name`, then `category`
//! 2. resolve or create the category
//! 3. ingest the image, if any
//! 4. insert the item
//!
//! Each call opens its own database connection and closes it on return.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::database::categories::CategoryRegistry;
use crate::database::repo::{CatalogEntry, Item, ItemRepo};
use crate::database::store::Database;
use crate::error::{CatalogError, CatalogResult, Field};
use crate::ingest::hasher::IMAGE_EXTENSION;
use crate::ingest::images::{ImageError, ImageStore, ImageUpload, StoredImage};

#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub category: String,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    db: Database,
    images: ImageStore,
}

impl Catalog {
    pub fn new(db: Database, images: ImageStore) -> Self {
        Self { db, images }
    }

    pub fn submit(&self, submission: Submission) -> CatalogResult<Ack> {
        validate(&submission)?;
        info!("Receive item: {} ({})", submission.name, submission.category);

        let conn = self.db.open().map_err(|e| failed("open database", e.into()))?;

        let category_id = CategoryRegistry::new(&conn)
            .resolve_or_create(&submission.category)
            .map_err(|e| failed("resolve category", e.into()))?;

        let image = self
            .images
            .ingest(submission.image.as_ref())
            .map_err(|e| failed("ingest image", e.into()))?;

        let id = ItemRepo::new(&conn)
            .insert(&submission.name, category_id, image.as_deref())
            .map_err(|e| failed("insert item", e.into()))?;

        info!("Stored item {} as id {}", submission.name, id);
        Ok(Ack {
            message: format!("item received: {}", submission.name),
        })
    }

    pub fn list(&self) -> CatalogResult<Vec<CatalogEntry>> {
        let conn = self.db.open()?;
        Ok(ItemRepo::new(&conn).list_all()?)
    }

    pub fn search(&self, keyword: &str) -> CatalogResult<Vec<CatalogEntry>> {
        let conn = self.db.open()?;
        Ok(ItemRepo::new(&conn).search(keyword)?)
    }

    pub fn detail(&self, id: i64) -> CatalogResult<Item> {
        let conn = self.db.open()?;
        ItemRepo::new(&conn)
            .find_by_id(id)?
            .ok_or(CatalogError::NotFound(id))
    }

    pub fn fetch_image(&self, requested: &str) -> CatalogResult<StoredImage> {
        self.images.fetch(requested).map_err(|e| match e {
            ImageError::InvalidName(name) => CatalogError::BadRequest(format!(
                "image name must be a file name ending in .{IMAGE_EXTENSION}: {name}"
            )),
            other => other.into(),
        })
    }
}

/// Checks required fields in order; the first empty one wins.
fn validate(submission: &Submission) -> CatalogResult<()> {
    if submission.name.is_empty() {
        warn!("Rejected submission: missing name");
        return Err(CatalogError::MissingField(Field::Name));
    }
    if submission.category.is_empty() {
        warn!("Rejected submission {}: missing category", submission.name);
        return Err(CatalogError::MissingField(Field::Category));
    }
    Ok(())
}

// The caller logs the failure itself; this only records the stage.
fn failed(stage: &str, err: CatalogError) -> CatalogError {
    debug!("Submission failed at {}: {}", stage, err);
    err
}
