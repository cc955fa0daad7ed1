//! Authentication handlers

use std::time::Duration;

use axum::{
    Json,
    extract::{Extension, State},
};
use serde::Serialize;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AdminRole, LoginRequest, LoginResponse};
use crate::db::repository::AdminUserRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Fixed delay so response time does not reveal whether the user exists
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login
///
/// Unknown user and wrong password share one error message to prevent
/// username enumeration.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if state.throttle.is_locked(&req.username) {
        security_log!("WARN", "login_throttled", username = req.username.clone());
        return Err(AppError::forbidden(
            "Too many failed login attempts, try again later",
        ));
    }

    let repo = AdminUserRepository::new(state.db.db.clone());
    let user = repo.find_by_username(&req.username).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(user) => {
            if !user.is_active {
                return Err(AppError::forbidden("Account has been disabled"));
            }
            if !user.verify_password(&req.password) {
                state.throttle.record_failure(&req.username);
                state
                    .audit
                    .log(
                        AuditAction::LoginFailed,
                        "auth",
                        Some(format!("admin_user:{}", req.username)),
                        None,
                        None,
                        Some(serde_json::json!({ "reason": "invalid_credentials" })),
                    )
                    .await;
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            user
        }
        None => {
            state.throttle.record_failure(&req.username);
            state
                .audit
                .log(
                    AuditAction::LoginFailed,
                    "auth",
                    Some(format!("admin_user:{}", req.username)),
                    None,
                    None,
                    Some(serde_json::json!({ "reason": "user_not_found" })),
                )
                .await;
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    state.throttle.clear(&req.username);

    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let role_name = match user.role {
        AdminRole::Admin => "ADMIN",
        AdminRole::Viewer => "VIEWER",
    };
    let permissions = user.role.permissions();

    let token = state
        .jwt
        .generate_token(&user_id, &user.username, role_name, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    state
        .audit
        .log(
            AuditAction::LoginSuccess,
            "auth",
            Some(user_id.clone()),
            Some(user_id.clone()),
            Some(user.display_name.clone()),
            Some(serde_json::json!({ "username": &user.username })),
        )
        .await;

    tracing::info!(
        user_id = %user_id,
        username = %user.username,
        role = role_name,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        display_name: user.display_name,
        role: user.role,
        expires_in: state.jwt.expires_in_seconds(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
}

/// GET /api/auth/me
///
/// Token claims plus a fresh read of the account record, so a disable that
/// happened after the token was issued is visible.
pub async fn me(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<MeResponse>> {
    let repo = AdminUserRepository::new(state.db.db.clone());
    let user = repo
        .find_by_id(&current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Account no longer exists"))?;

    Ok(Json(MeResponse {
        id: current_user.id,
        username: user.username,
        display_name: user.display_name,
        role: current_user.role,
        permissions: current_user.permissions,
        is_active: user.is_active,
        created_at: user.created_at,
    }))
}
