//! Health endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::state::AppState;

/// GET /health
///
/// Unauthenticated. `ok` means the process is serving; `db` reports a
/// live store ping so a degraded instance is visible without failing
/// the probe outright.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (db, db_error) = match state.notes.health_check().await {
        Ok(()) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    Json(serde_json::json!({
        "ok": true,
        "db": db,
        "dbError": db_error,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
