//! Abandoned Cart API
//!
//! The track endpoint is public (the storefront calls it without a token);
//! everything else sits behind the admin permission layers.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/carts/track", post(handler::track))
        .nest("/api/abandoned-carts", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(
            "abandoned_carts:read",
        )));

    let manage_routes = Router::new()
        .route("/purge", post(handler::purge))
        .route("/{id}/recover", post(handler::recover))
        .layer(middleware::from_fn(require_permission(
            "abandoned_carts:manage",
        )));

    read_routes.merge(manage_routes)
}
