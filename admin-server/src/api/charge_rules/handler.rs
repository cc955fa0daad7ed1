//! Charge Rule API Handlers
//!
//! Updates are merged onto the stored record and re-validated as a whole
//! before they land, so the amount fields can never drift out of step with
//! `charge_type`.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ChargeRule, ChargeRuleCreate, ChargeRuleUpdate};
use crate::db::repository::{ChargeRuleRepository, ReorderItem};
use crate::pricing::RuleKind;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "charge_rule";

/// GET /api/charge-rules
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ChargeRule>>> {
    let repo = ChargeRuleRepository::new(state.db.db.clone());
    let rules = repo.find_all().await?;
    Ok(Json(rules))
}

/// GET /api/charge-rules/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ChargeRule>> {
    let repo = ChargeRuleRepository::new(state.db.db.clone());
    let rule = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Charge rule {} not found", id)))?;
    Ok(Json(rule))
}

/// POST /api/charge-rules
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ChargeRuleCreate>,
) -> AppResult<Json<ChargeRule>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    payload.validate_semantics().map_err(AppError::validation)?;

    let repo = ChargeRuleRepository::new(state.db.db.clone());
    let rule = repo.create(payload).await?;
    state.snapshots.invalidate(RuleKind::Charge);

    let id = rule.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    state
        .audit
        .log(
            AuditAction::ChargeRuleCreated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "code": &rule.code, "charge_type": &rule.charge_type })),
        )
        .await;

    Ok(Json(rule))
}

/// PUT /api/charge-rules/:id
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ChargeRuleUpdate>,
) -> AppResult<Json<ChargeRule>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = ChargeRuleRepository::new(state.db.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Charge rule {} not found", id)))?;

    let merged = payload.merge(&existing);
    merged.validate_semantics().map_err(AppError::validation)?;

    let rule = repo.replace(&id, merged).await?;
    state.snapshots.invalidate(RuleKind::Charge);

    state
        .audit
        .log(
            AuditAction::ChargeRuleUpdated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "code": &rule.code })),
        )
        .await;

    Ok(Json(rule))
}

#[derive(Debug, Deserialize)]
pub struct EnabledPayload {
    pub enabled: bool,
}

/// PATCH /api/charge-rules/:id/enabled
pub async fn set_enabled(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<EnabledPayload>,
) -> AppResult<Json<ChargeRule>> {
    let repo = ChargeRuleRepository::new(state.db.db.clone());
    let rule = repo.set_enabled(&id, payload.enabled).await?;
    state.snapshots.invalidate(RuleKind::Charge);

    state
        .audit
        .log(
            AuditAction::ChargeRuleUpdated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "enabled": payload.enabled })),
        )
        .await;

    Ok(Json(rule))
}

/// PUT /api/charge-rules/reorder
pub async fn reorder(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(items): Json<Vec<ReorderItem>>,
) -> AppResult<Json<Vec<ChargeRule>>> {
    let repo = ChargeRuleRepository::new(state.db.db.clone());
    let count = items.len();
    repo.reorder(items).await?;
    state.snapshots.invalidate(RuleKind::Charge);

    state
        .audit
        .log(
            AuditAction::ChargeRulesReordered,
            RESOURCE,
            None,
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "count": count })),
        )
        .await;

    let rules = repo.find_all().await?;
    Ok(Json(rules))
}

/// DELETE /api/charge-rules/:id
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = ChargeRuleRepository::new(state.db.db.clone());
    if !repo.delete(&id).await? {
        return Err(AppError::not_found(format!("Charge rule {} not found", id)));
    }
    state.snapshots.invalidate(RuleKind::Charge);

    state
        .audit
        .log(
            AuditAction::ChargeRuleDeleted,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
