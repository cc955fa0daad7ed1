//! Payment Settings API Handlers

use axum::{
    Json,
    extract::{Extension, State},
};

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{PaymentSettings, PaymentSettingsUpdate};
use crate::db::repository::PaymentSettingsRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "payment_settings";

/// GET /api/payment-settings
pub async fn get_settings(State(state): State<ServerState>) -> AppResult<Json<PaymentSettings>> {
    let repo = PaymentSettingsRepository::new(state.db.db.clone());
    let settings = repo.get().await?;
    Ok(Json(settings))
}

/// PUT /api/payment-settings
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PaymentSettingsUpdate>,
) -> AppResult<Json<PaymentSettings>> {
    let repo = PaymentSettingsRepository::new(state.db.db.clone());
    let current = repo.get().await?;
    payload
        .validate_semantics(&current)
        .map_err(AppError::validation)?;

    let settings = repo.update(payload).await?;

    state
        .audit
        .log(
            AuditAction::PaymentSettingsUpdated,
            RESOURCE,
            Some("payment_settings:main".to_string()),
            Some(current_user.id.clone()),
            Some(current_user.username.clone()),
            Some(serde_json::json!({
                "flow": &settings.flow,
                "default_payment": &settings.default_payment,
                "cod_enabled": settings.cod_enabled,
                "online_enabled": settings.online_enabled,
            })),
        )
        .await;

    Ok(Json(settings))
}
