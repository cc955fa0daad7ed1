//! Charge Rule API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/charge-rules", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("charge_rules:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/reorder", put(handler::reorder))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/enabled", patch(handler::set_enabled))
        .layer(middleware::from_fn(require_permission(
            "charge_rules:manage",
        )));

    read_routes.merge(manage_routes)
}
