//! Insurance Plan API Handlers
//!
//! Updates are merged onto the stored record and the bounds re-checked on
//! the merged whole, so a partial update cannot invert a window.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{InsurancePlan, InsurancePlanCreate, InsurancePlanUpdate};
use crate::db::repository::{InsurancePlanRepository, ReorderItem};
use crate::pricing::RuleKind;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "insurance_plan";

/// GET /api/insurance-plans
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<InsurancePlan>>> {
    let repo = InsurancePlanRepository::new(state.db.db.clone());
    let plans = repo.find_all().await?;
    Ok(Json(plans))
}

/// GET /api/insurance-plans/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<InsurancePlan>> {
    let repo = InsurancePlanRepository::new(state.db.db.clone());
    let plan = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Insurance plan {} not found", id)))?;
    Ok(Json(plan))
}

/// POST /api/insurance-plans
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<InsurancePlanCreate>,
) -> AppResult<Json<InsurancePlan>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    payload.validate_semantics().map_err(AppError::validation)?;

    let repo = InsurancePlanRepository::new(state.db.db.clone());
    let plan = repo.create(payload).await?;
    state.snapshots.invalidate(RuleKind::Insurance);

    let id = plan.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    state
        .audit
        .log(
            AuditAction::InsurancePlanCreated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "code": &plan.code, "mandatory": plan.mandatory })),
        )
        .await;

    Ok(Json(plan))
}

/// PUT /api/insurance-plans/:id
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<InsurancePlanUpdate>,
) -> AppResult<Json<InsurancePlan>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = InsurancePlanRepository::new(state.db.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Insurance plan {} not found", id)))?;

    let merged = payload.merge(&existing);
    merged.validate_semantics().map_err(AppError::validation)?;

    let plan = repo.replace(&id, merged).await?;
    state.snapshots.invalidate(RuleKind::Insurance);

    state
        .audit
        .log(
            AuditAction::InsurancePlanUpdated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "code": &plan.code })),
        )
        .await;

    Ok(Json(plan))
}

#[derive(Debug, Deserialize)]
pub struct EnabledPayload {
    pub enabled: bool,
}

/// PATCH /api/insurance-plans/:id/enabled
pub async fn set_enabled(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<EnabledPayload>,
) -> AppResult<Json<InsurancePlan>> {
    let repo = InsurancePlanRepository::new(state.db.db.clone());
    let plan = repo.set_enabled(&id, payload.enabled).await?;
    state.snapshots.invalidate(RuleKind::Insurance);

    state
        .audit
        .log(
            AuditAction::InsurancePlanUpdated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "enabled": payload.enabled })),
        )
        .await;

    Ok(Json(plan))
}

/// PUT /api/insurance-plans/reorder
pub async fn reorder(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(items): Json<Vec<ReorderItem>>,
) -> AppResult<Json<Vec<InsurancePlan>>> {
    let repo = InsurancePlanRepository::new(state.db.db.clone());
    let count = items.len();
    repo.reorder(items).await?;
    state.snapshots.invalidate(RuleKind::Insurance);

    state
        .audit
        .log(
            AuditAction::InsurancePlansReordered,
            RESOURCE,
            None,
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "count": count })),
        )
        .await;

    let plans = repo.find_all().await?;
    Ok(Json(plans))
}

/// DELETE /api/insurance-plans/:id
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = InsurancePlanRepository::new(state.db.db.clone());
    if !repo.delete(&id).await? {
        return Err(AppError::not_found(format!(
            "Insurance plan {} not found",
            id
        )));
    }
    state.snapshots.invalidate(RuleKind::Insurance);

    state
        .audit
        .log(
            AuditAction::InsurancePlanDeleted,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
