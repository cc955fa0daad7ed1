//! Payment Settings API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payment-settings", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::get_settings))
        .layer(middleware::from_fn(require_permission(
            "payment_settings:read",
        )));

    let manage_routes = Router::new()
        .route("/", put(handler::update))
        .layer(middleware::from_fn(require_permission(
            "payment_settings:manage",
        )));

    read_routes.merge(manage_routes)
}
