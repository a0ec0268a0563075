//! Note sync endpoints: list, save (create-or-update), delete.

use axum::extract::{Path, State};
use axum::Json;

use nimbus_core::{NoteRecord, SaveNoteRequest};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::services::sync::SyncService;
use crate::state::AppState;

fn sync_service(state: &AppState) -> SyncService {
    SyncService::new(state.notes.clone(), state.users.clone(), state.policy.clone())
}

/// GET /notes
///
/// The caller's notes, newest first by `lastModified`.
pub async fn list_notes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<NoteRecord>>, ApiError> {
    let notes = sync_service(&state).list(&user.user_id).await?;
    Ok(Json(notes))
}

/// POST /notes
///
/// Quota-gated create-or-update. Quota denials surface as 403 with the
/// structured denial body; a supplied id that does not resolve to a
/// note the caller owns is a 404, never a silent create.
pub async fn save_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SaveNoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = sync_service(&state).save(&user.user_id, req).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "id": outcome.id,
        "plan": outcome.plan,
        "limits": outcome.limits,
    })))
}

/// DELETE /notes/:id
///
/// Always succeeds: missing, foreign, and malformed ids are no-ops.
pub async fn delete_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    sync_service(&state).delete(&user.user_id, &id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
