//! Quote API Handlers

use axum::{Json, extract::State};
use rust_decimal::Decimal;

use crate::core::ServerState;
use crate::db::models::DefaultPayment;
use crate::db::repository::PaymentSettingsRepository;
use crate::pricing::{Breakdown, OrderContext, evaluate};
use crate::utils::{AppError, AppResult};

/// POST /api/quote
///
/// Evaluates the configured rules against the order facts. When the order
/// carries no payment method, the configured default (if any) is filled in
/// before the charge rules see the context.
pub async fn quote(
    State(state): State<ServerState>,
    Json(mut ctx): Json<OrderContext>,
) -> AppResult<Json<Breakdown>> {
    if ctx.subtotal < Decimal::ZERO {
        return Err(AppError::validation("subtotal must not be negative"));
    }
    if let Some(declared) = ctx.declared_value
        && declared < Decimal::ZERO
    {
        return Err(AppError::validation("declared_value must not be negative"));
    }

    let settings = PaymentSettingsRepository::new(state.db.db.clone())
        .get()
        .await?;

    if ctx.payment_method.is_none() {
        ctx.payment_method = match settings.default_payment {
            DefaultPayment::Online => Some("online".to_string()),
            DefaultPayment::Cod => Some("cod".to_string()),
            DefaultPayment::None => None,
        };
    }
    if ctx.is_cod() && !settings.cod_enabled {
        return Err(AppError::business_rule("Cash on delivery is disabled"));
    }
    if ctx.is_online() && !settings.online_enabled {
        return Err(AppError::business_rule("Online payment is disabled"));
    }

    let snapshot = state.snapshots.snapshot(&state.db).await?;
    let breakdown = evaluate(&ctx, &snapshot, state.schedule.as_ref())?;

    Ok(Json(breakdown))
}
