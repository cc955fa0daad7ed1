//! Tax Rule API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{TaxRule, TaxRuleCreate, TaxRuleUpdate};
use crate::db::repository::{ReorderItem, TaxRuleRepository};
use crate::pricing::RuleKind;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "tax_rule";

/// GET /api/tax-rules
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<TaxRule>>> {
    let repo = TaxRuleRepository::new(state.db.db.clone());
    let rules = repo.find_all().await?;
    Ok(Json(rules))
}

/// GET /api/tax-rules/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<TaxRule>> {
    let repo = TaxRuleRepository::new(state.db.db.clone());
    let rule = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tax rule {} not found", id)))?;
    Ok(Json(rule))
}

/// POST /api/tax-rules
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<TaxRuleCreate>,
) -> AppResult<Json<TaxRule>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    payload.validate_semantics().map_err(AppError::validation)?;

    let repo = TaxRuleRepository::new(state.db.db.clone());
    let rule = repo.create(payload).await?;
    state.snapshots.invalidate(RuleKind::Tax);

    let id = rule.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    state
        .audit
        .log(
            AuditAction::TaxRuleCreated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "code": &rule.code, "rate": &rule.rate })),
        )
        .await;

    Ok(Json(rule))
}

/// PUT /api/tax-rules/:id
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<TaxRuleUpdate>,
) -> AppResult<Json<TaxRule>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    payload.validate_semantics().map_err(AppError::validation)?;

    let repo = TaxRuleRepository::new(state.db.db.clone());
    let rule = repo.update(&id, payload).await?;
    state.snapshots.invalidate(RuleKind::Tax);

    state
        .audit
        .log(
            AuditAction::TaxRuleUpdated,
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

/// PATCH /api/tax-rules/:id/enabled
pub async fn set_enabled(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<EnabledPayload>,
) -> AppResult<Json<TaxRule>> {
    let repo = TaxRuleRepository::new(state.db.db.clone());
    let rule = repo.set_enabled(&id, payload.enabled).await?;
    state.snapshots.invalidate(RuleKind::Tax);

    state
        .audit
        .log(
            AuditAction::TaxRuleUpdated,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "enabled": payload.enabled })),
        )
        .await;

    Ok(Json(rule))
}

/// PUT /api/tax-rules/reorder
///
/// Returns the full list in the new evaluation order.
pub async fn reorder(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(items): Json<Vec<ReorderItem>>,
) -> AppResult<Json<Vec<TaxRule>>> {
    let repo = TaxRuleRepository::new(state.db.db.clone());
    let count = items.len();
    repo.reorder(items).await?;
    state.snapshots.invalidate(RuleKind::Tax);

    state
        .audit
        .log(
            AuditAction::TaxRulesReordered,
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

/// DELETE /api/tax-rules/:id
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = TaxRuleRepository::new(state.db.db.clone());
    if !repo.delete(&id).await? {
        return Err(AppError::not_found(format!("Tax rule {} not found", id)));
    }
    state.snapshots.invalidate(RuleKind::Tax);

    state
        .audit
        .log(
            AuditAction::TaxRuleDeleted,
            RESOURCE,
            Some(id),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
