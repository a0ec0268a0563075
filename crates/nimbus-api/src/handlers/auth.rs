//! Login endpoint: credential verification plus account upsert.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub credential: String,
}

/// POST /auth/google
///
/// Verifies the Google ID token, records the login (creating the
/// account on first sight), and returns the profile with the plan
/// snapshot. The credential itself is echoed back as the session
/// token; clients send it as the bearer token on every later call.
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.credential.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing credential".to_string()));
    }

    let identity = state.verifier.verify(&req.credential).await?;
    let account = state.users.upsert_login(&identity).await?;
    let limits = state.policy.limits_for(account.plan);

    info!(
        subsystem = "auth",
        user_id = %account.user_id,
        plan = %account.plan,
        "Login recorded"
    );

    Ok(Json(serde_json::json!({
        "user": {
            "id": account.user_id,
            "email": account.email,
            "name": account.name,
            "picture": account.picture,
        },
        "token": req.credential,
        "plan": account.plan,
        "limits": limits,
    })))
}
