use std::fmt;

use thiserror::Error;

use crate::ingest::images::ImageError;

/// Required submission fields, in the order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Category,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => f.write_str("name"),
            Field::Category => f.write_str("category"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("missing required field: {0}")]
    MissingField(Field),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("item {0} not found")]
    NotFound(i64),

    #[error("bad request: {0}")]
    BadRequest(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
