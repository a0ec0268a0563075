//! Billing endpoints: plan status and the pro upgrade.

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /billing/status
pub async fn billing_status(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limits = state.policy.limits_for(user.plan);
    Ok(Json(serde_json::json!({
        "plan": user.plan,
        "limits": limits,
    })))
}

/// POST /billing/upgrade
///
/// Switches the caller to the pro plan. Repeat upgrades are harmless;
/// `pro_activated_at` keeps its original value.
pub async fn upgrade(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let account = state.users.upgrade_to_pro(&user.user_id).await?;
    let limits = state.policy.limits_for(account.plan);

    info!(
        subsystem = "billing",
        user_id = %account.user_id,
        "Plan upgraded to pro"
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "plan": account.plan,
        "limits": limits,
    })))
}
