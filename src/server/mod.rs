//! HTTP surface for the catalog.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Greeting |
//! | `POST` | `/items` | Submit an item (multipart: `name`, `category`, `image`) |
//! | `GET`  | `/items` | List every item with its category |
//! | `GET`  | `/search?keyword=` | Items whose name equals the keyword |
//! | `GET`  | `/items/{id}` | One item by id |
//! | `GET`  | `/image/{name}` | Stored image bytes, or the default image |

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::server::handlers::{add_item, get_image, item_detail, list_items, root, search_items};
use crate::utils::config::Config;

/// Builds the app. `max_upload_bytes` caps the `POST /items` body, which
/// replaces axum's 2 MiB default on that route only.
pub fn router(catalog: Catalog, front_url: &str, max_upload_bytes: usize) -> Router {
    let mut cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::PUT,
        Method::POST,
        Method::DELETE,
    ]);
    match front_url.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => warn!("Ignoring invalid CORS origin {:?}: {}", front_url, e),
    }

    Router::new()
        .route("/", get(root))
        .route(
            "/items",
            get(list_items).post(add_item.layer(DefaultBodyLimit::max(max_upload_bytes))),
        )
        .route("/items/{id}", get(item_detail))
        .route("/search", get(search_items))
        .route("/image/{name}", get(get_image))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

pub async fn serve(catalog: Catalog, bind: &str, config: &Config) -> Result<()> {
    let app = router(catalog, &config.front_url, config.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Catalog server listening on http://{}", bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
