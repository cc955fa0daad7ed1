//! Banner API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Banner, BannerCreate, BannerUpdate};
use crate::db::repository::BannerRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "banner";

/// GET /api/banners
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Banner>>> {
    let repo = BannerRepository::new(state.db.db.clone());
    let banners = repo.find_all().await?;
    Ok(Json(banners))
}

/// GET /api/banners/active — banners live right now, in display order
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Banner>>> {
    let repo = BannerRepository::new(state.db.db.clone());
    let banners = repo.find_live().await?;
    Ok(Json(banners))
}

/// GET /api/banners/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Banner>> {
    let repo = BannerRepository::new(state.db.db.clone());
    let banner = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Banner {} not found", id)))?;
    Ok(Json(banner))
}

/// POST /api/banners
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<BannerCreate>,
) -> AppResult<Json<Banner>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    payload.validate_semantics().map_err(AppError::validation)?;

    let repo = BannerRepository::new(state.db.db.clone());
    let banner = repo.create(payload).await?;

    let id = banner
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    state
        .audit
        .log(
            AuditAction::BannerCreated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "title": &banner.title })),
        )
        .await;

    Ok(Json(banner))
}

/// PUT /api/banners/:id
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<BannerUpdate>,
) -> AppResult<Json<Banner>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = BannerRepository::new(state.db.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Banner {} not found", id)))?;

    // Window check against the merged record
    let starts_at = payload.starts_at.or(existing.starts_at);
    let ends_at = payload.ends_at.or(existing.ends_at);
    if let (Some(s), Some(e)) = (starts_at, ends_at)
        && e <= s
    {
        return Err(AppError::validation("ends_at must be after starts_at"));
    }

    let banner = repo.update(&id, payload).await?;

    state
        .audit
        .log(
            AuditAction::BannerUpdated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "title": &banner.title })),
        )
        .await;

    Ok(Json(banner))
}

/// DELETE /api/banners/:id
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = BannerRepository::new(state.db.db.clone());
    if !repo.delete(&id).await? {
        return Err(AppError::not_found(format!("Banner {} not found", id)));
    }

    state
        .audit
        .log(
            AuditAction::BannerDeleted,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
