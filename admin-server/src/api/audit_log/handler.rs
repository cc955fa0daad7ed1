//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Extension, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditEntry, AuditQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

const RESOURCE: &str = "audit_log";

/// GET /api/audit-log — filtered page, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    let entries = state.audit.query(query).await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct PurgeRequest {
    /// Entries created before this cutoff (milliseconds since epoch) are dropped
    pub before: i64,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub removed: usize,
}

/// POST /api/audit-log/purge
///
/// The purge itself is logged, so the trail records its own truncation.
pub async fn purge(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PurgeRequest>,
) -> AppResult<Json<PurgeResponse>> {
    let removed = state.audit.purge_before(payload.before).await?;

    state
        .audit
        .log(
            AuditAction::AuditPurged,
            RESOURCE,
            None,
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({ "before": payload.before, "removed": removed })),
        )
        .await;

    Ok(Json(PurgeResponse { removed }))
}
