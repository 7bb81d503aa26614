//! Route wiring for the gateway.
//!
//! There are no named endpoints: every path belongs to the bucket. `/` maps
//! to a listing of the whole bucket and `/{*path}` to the object-or-prefix
//! decision for everything else. Both routes accept any method; the handler
//! makes no distinction.

use crate::handlers::gateway_handlers::{GatewayState, serve_path, serve_root};
use axum::{Router, routing::any};

/// Build the router. The shared [`GatewayState`] carries the store client
/// to both handlers.
pub fn routes() -> Router<GatewayState> {
    Router::new()
        .route("/", any(serve_root))
        .route("/{*path}", any(serve_path))
}
