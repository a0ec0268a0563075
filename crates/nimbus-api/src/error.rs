//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use nimbus_core::QuotaDenial;

/// API-level error, mapped onto HTTP status codes and JSON bodies.
#[derive(Debug)]
pub enum ApiError {
    /// Unexpected internal fault; logged in full, reported generically.
    Internal(nimbus_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// Structured plan-quota denial, rendered verbatim so the client
    /// can show an upgrade prompt.
    QuotaDenied(Box<QuotaDenial>),
    /// An upstream dependency (store or AI provider) is unreachable.
    ServiceUnavailable(String),
}

impl From<nimbus_core::Error> for ApiError {
    fn from(err: nimbus_core::Error) -> Self {
        use nimbus_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note {} not found", id)),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(_) => {
                // One generic message, regardless of which check failed.
                ApiError::Unauthorized("Authentication required".to_string())
            }
            Error::QuotaExceeded(denial) => ApiError::QuotaDenied(Box::new(denial)),
            Error::Provider(_) | Error::Request(_) => {
                ApiError::ServiceUnavailable("AI service unavailable".to_string())
            }
            Error::Database(ref sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    return ApiError::Conflict(
                        "A note with this localId already exists".to_string(),
                    );
                }
                if matches!(
                    sqlx_err,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                ) {
                    return ApiError::ServiceUnavailable("Database unavailable".to_string());
                }
                ApiError::Internal(err)
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::QuotaDenied(denial) = self {
            let body = Json(serde_json::json!({
                "error": denial.message,
                "errorCode": denial.code,
                "limitType": denial.limit_type,
                "requiresPro": denial.requires_pro,
                "plan": denial.plan,
                "limits": denial.limits,
                "usage": denial.usage,
            }));
            return (StatusCode::FORBIDDEN, body).into_response();
        }

        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::QuotaDenied(_) => unreachable!("handled above"),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
