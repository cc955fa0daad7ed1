//! Audit Log API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/audit-log", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_permission("audit_log:read")));

    let manage_routes = Router::new()
        .route("/purge", post(handler::purge))
        .layer(middleware::from_fn(require_permission("audit_log:manage")));

    read_routes.merge(manage_routes)
}
