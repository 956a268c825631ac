//! Maps core errors to HTTP responses.
//!
//! Callers only ever see a stable message per failure kind. The underlying
//! storage or filesystem detail is logged here and dropped.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::CatalogError;
use crate::ingest::hasher::IMAGE_EXTENSION;

/// Body shared by every JSON reply that carries only a message.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the request was trying to do, used to pick the generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateItem,
    GetItem,
    GetImage,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(action: Action) -> Self {
        let message = match action {
            Action::CreateItem => "Failed to create item",
            Action::GetItem => "Failed to get item",
            Action::GetImage => "Failed to get image",
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn from_catalog(err: CatalogError, action: Action) -> Self {
        match err {
            CatalogError::MissingField(field) => {
                warn!("Failed to create item: {}", err);
                Self::bad_request(format!("Failed to create item. Please fill {}.", field))
            }
            CatalogError::Storage(ref e) => {
                error!("Storage failure during {:?}: {}", action, e);
                Self::internal(action)
            }
            CatalogError::Image(ref e) => {
                error!("Image failure during {:?}: {}", action, e);
                match action {
                    Action::CreateItem => {
                        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create image")
                    }
                    _ => Self::internal(Action::GetImage),
                }
            }
            CatalogError::NotFound(id) => {
                warn!("Item {} not found", id);
                Self::new(StatusCode::NOT_FOUND, "Item not found")
            }
            CatalogError::BadRequest(ref detail) => {
                warn!("Bad request during {:?}: {}", action, detail);
                Self::bad_request(format!("Image path does not end with .{}", IMAGE_EXTENSION))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Message::new(self.message))).into_response()
    }
}
