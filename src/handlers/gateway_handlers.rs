//! HTTP handlers for the gateway.
//!
//! Every request resolves the same way: stat the path against the bucket,
//! stream the object when the stat reports content, and render an HTML
//! listing of the prefix otherwise. Backend failures never surface as
//! error statuses; they degrade to a listing (or to an empty one).

use crate::{
    models::listing::{LISTING_TITLE, ListingEntry, ListingPage},
    models::object::ObjectBody,
    services::object_store::ObjectStore,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Fixed body returned when no store client could be constructed.
pub const BACKEND_UNAVAILABLE: &str = "Failed to connect to backend.";

/// Shared state: the store client, or `None` when construction failed at
/// startup. Everything else is request-local.
#[derive(Clone)]
pub struct GatewayState {
    store: Option<Arc<dyn ObjectStore>>,
}

impl GatewayState {
    pub fn new(store: Option<Arc<dyn ObjectStore>>) -> Self {
        Self { store }
    }
}

/// Handler for `/` — a listing of the whole bucket.
pub async fn serve_root(State(state): State<GatewayState>) -> Response {
    serve(&state, "").await
}

/// Handler for `/{*path}` — any other path, any method.
pub async fn serve_path(State(state): State<GatewayState>, Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/').to_string();
    serve(&state, &path).await
}

async fn serve(state: &GatewayState, path: &str) -> Response {
    let Some(store) = state.store.as_deref() else {
        return Response::new(Body::from(BACKEND_UNAVAILABLE));
    };

    match store.stat_object(path).await {
        Ok(stat) if stat.size > 0 => match store.get_object(path).await {
            Ok(object) => object_response(path, object),
            Err(err) => {
                warn!(
                    "fetch of `{}` failed after a successful stat, listing instead: {}",
                    path, err
                );
                listing_response(store, path).await
            }
        },
        Ok(_) => listing_response(store, path).await,
        Err(err) => {
            debug!("stat of `{}` failed, treating as prefix: {}", path, err);
            listing_response(store, path).await
        }
    }
}

/// Stream an object body to the client.
///
/// The last path segment names the download; the last-modified hint is the
/// current wall-clock time, so conditional requests always see a fresh
/// response.
fn object_response(path: &str, object: ObjectBody) -> Response {
    let filename = path.rsplit('/').next().unwrap_or(path);

    let mut response = Response::new(Body::from_stream(object.stream));
    let headers = response.headers_mut();

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".into());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    if let Some(size) = object.size {
        if let Ok(value) = HeaderValue::from_str(&size.max(0).to_string()) {
            headers.insert(header::CONTENT_LENGTH, value);
        }
    }

    headers.insert(
        header::LAST_MODIFIED,
        HeaderValue::from_str(&Utc::now().to_rfc2822())
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );

    if let Ok(value) = HeaderValue::from_str(&format!("inline; filename=\"{}\"", filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}

/// Enumerate the prefix and render the listing document.
///
/// Error entries are skipped, a failed list call yields an empty page, and
/// the enumeration is stopped once the page is complete.
async fn listing_response(store: &dyn ObjectStore, prefix: &str) -> Response {
    let mut page = ListingPage::new(LISTING_TITLE);

    match store.list_objects(prefix).await {
        Ok(mut keys) => {
            while let Some(item) = keys.next().await {
                match item {
                    Ok(key) => {
                        let suffix = key.strip_prefix(prefix).unwrap_or(&key);
                        if !suffix.is_empty() {
                            page.push(ListingEntry::new(suffix));
                        }
                    }
                    Err(err) => {
                        warn!("listing under `{}` returned an error entry: {}", prefix, err);
                    }
                }
            }
            keys.stop();
        }
        Err(err) => {
            error!("listing objects under `{}` failed: {}", prefix, err);
        }
    }

    let mut response = Response::new(Body::from(page.render()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}
