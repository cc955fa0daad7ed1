//! HTTP server assembly
//!
//! Builds the full router out of the per-resource routers and runs it with
//! graceful shutdown.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;
use crate::utils::AppError;

/// Assemble the application router.
///
/// Authentication is enforced globally by [`require_auth`]; per-resource
/// permission checks are layered inside each resource router.
pub fn build_app(state: ServerState) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        .merge(api::tax_rules::router())
        .merge(api::charge_rules::router())
        .merge(api::insurance_plans::router())
        .merge(api::payment_settings::router())
        .merge(api::banners::router())
        .merge(api::abandoned_carts::router())
        .merge(api::audit_log::router())
        .merge(api::quote::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Request/response log line with latency
async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        target: "http",
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// HTTP server
pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Bind and serve until SIGINT/SIGTERM
    pub async fn run(self) -> Result<(), AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let app = build_app(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        tracing::info!("Listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
