use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Ack, Catalog, Submission};
use crate::database::repo::{CatalogEntry, Item};
use crate::error::CatalogResult;
use crate::ingest::images::ImageUpload;
use crate::server::error::{Action, ApiError, Message};

#[derive(Debug, Serialize)]
pub struct ItemList {
    pub items: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
}

/// Runs a blocking catalog call off the async runtime.
async fn run<T, F>(catalog: &Catalog, action: Action, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Catalog) -> CatalogResult<T> + Send + 'static,
{
    let catalog = catalog.clone();
    tokio::task::spawn_blocking(move || f(&catalog))
        .await
        .map_err(|e| {
            tracing::error!("Catalog task failed: {}", e);
            ApiError::internal(action)
        })?
        .map_err(|e| ApiError::from_catalog(e, action))
}

pub async fn root() -> Json<Message> {
    Json(Message::new("Hello, world!"))
}

pub async fn add_item(
    State(catalog): State<Catalog>,
    mut multipart: Multipart,
) -> Result<Json<Ack>, ApiError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(form_error)?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => submission.name = read_text(field).await?,
            "category" => submission.category = read_text(field).await?,
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(form_error)?;
                // Browsers send an empty, unnamed part when no file is picked.
                if !file_name.is_empty() || !bytes.is_empty() {
                    submission.image = Some(ImageUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    let ack = run(&catalog, Action::CreateItem, move |c| c.submit(submission)).await?;
    Ok(Json(ack))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(form_error)
}

/// Oversized bodies get 413; any other malformed form is a 400.
fn form_error(err: MultipartError) -> ApiError {
    let status = err.status();
    warn!("Rejected form upload ({}): {}", status, err);
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(status, "Failed to create item. Upload is too large.")
    } else {
        ApiError::bad_request("Failed to create item. Invalid form data.")
    }
}

pub async fn list_items(State(catalog): State<Catalog>) -> Result<Json<ItemList>, ApiError> {
    let items = run(&catalog, Action::GetItem, |c| c.list()).await?;
    Ok(Json(ItemList { items }))
}

pub async fn search_items(
    State(catalog): State<Catalog>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ItemList>, ApiError> {
    let items = run(&catalog, Action::GetItem, move |c| c.search(&params.keyword)).await?;
    Ok(Json(ItemList { items }))
}

pub async fn item_detail(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let id: i64 = id.parse().map_err(|e| {
        warn!("Invalid item id {:?}: {}", id, e);
        ApiError::bad_request("Failed to get item")
    })?;
    let item = run(&catalog, Action::GetItem, move |c| c.detail(id)).await?;
    Ok(Json(item))
}

pub async fn get_image(
    State(catalog): State<Catalog>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image = run(&catalog, Action::GetImage, move |c| c.fetch_image(&name)).await?;
    debug!("Serving {:?} as {}", image.path, image.mime_type);
    Ok(([(header::CONTENT_TYPE, image.mime_type)], image.bytes))
}
