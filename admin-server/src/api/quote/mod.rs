//! Quote API

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/quote", post(handler::quote))
        .route_layer(middleware::from_fn(require_permission("quote:read")))
}
