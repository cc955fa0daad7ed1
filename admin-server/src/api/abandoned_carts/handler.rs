//! Abandoned Cart API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AbandonedCart, CartStatus, CartTrackRequest};
use crate::db::repository::AbandonedCartRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "abandoned_cart";
const DEFAULT_PAGE: usize = 50;
const MAX_PAGE: usize = 500;

/// POST /api/carts/track — storefront cart snapshot, no auth
///
/// Returns a minimal acknowledgement, never the stored record.
pub async fn track(
    State(state): State<ServerState>,
    Json(payload): Json<CartTrackRequest>,
) -> AppResult<Json<TrackResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    payload.validate_semantics().map_err(AppError::validation)?;

    let repo = AbandonedCartRepository::new(state.db.db.clone());
    let cart = repo.track(payload).await?;

    Ok(Json(TrackResponse {
        cart_token: cart.cart_token,
        status: cart.status,
        last_seen_at: cart.last_seen_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub cart_token: String,
    pub status: CartStatus,
    pub last_seen_at: i64,
}

/// Cart list filter
#[derive(Debug, Deserialize)]
pub struct CartListQuery {
    pub status: Option<CartStatus>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

/// GET /api/abandoned-carts
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CartListQuery>,
) -> AppResult<Json<Vec<AbandonedCart>>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE).min(MAX_PAGE);
    let repo = AbandonedCartRepository::new(state.db.db.clone());
    let carts = repo.find_page(query.status, query.offset, limit).await?;
    Ok(Json(carts))
}

/// GET /api/abandoned-carts/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AbandonedCart>> {
    let repo = AbandonedCartRepository::new(state.db.db.clone());
    let cart = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart {} not found", id)))?;
    Ok(Json(cart))
}

/// POST /api/abandoned-carts/:id/recover
pub async fn recover(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<AbandonedCart>> {
    let repo = AbandonedCartRepository::new(state.db.db.clone());
    let cart = repo.mark_recovered(&id).await?;

    state
        .audit
        .log(
            AuditAction::CartRecovered,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "cart_token": &cart.cart_token })),
        )
        .await;

    Ok(Json(cart))
}

#[derive(Debug, Deserialize)]
pub struct PurgeRequest {
    /// Carts last seen before this cutoff (milliseconds since epoch) are dropped
    pub before: i64,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub removed: usize,
}

/// POST /api/abandoned-carts/purge
pub async fn purge(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PurgeRequest>,
) -> AppResult<Json<PurgeResponse>> {
    let repo = AbandonedCartRepository::new(state.db.db.clone());
    let removed = repo.purge_before(payload.before).await?;

    state
        .audit
        .log(
            AuditAction::CartsPurged,
            RESOURCE,
            None,
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "before": payload.before, "removed": removed })),
        )
        .await;

    Ok(Json(PurgeResponse { removed }))
}
