//! Authentication: the Google token verifier and the request extractor.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use serde::Deserialize;
use tracing::debug;

use nimbus_core::{defaults, Error, IdentityVerifier, PlanTier, Result, VerifiedIdentity};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// GOOGLE TOKEN VERIFIER
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    aud: String,
    #[serde(default)]
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: String,
}

/// Verifies Google ID tokens against the tokeninfo endpoint, bound to
/// one expected audience.
///
/// Every failure mode maps to the same opaque unauthorized error: the
/// caller never learns whether the token was malformed, expired, or
/// issued for another client.
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    expected_audience: String,
}

impl GoogleTokenVerifier {
    pub fn new(expected_audience: impl Into<String>) -> Self {
        Self::with_endpoint(defaults::TOKENINFO_URL, expected_audience)
    }

    /// Verifier against a custom tokeninfo endpoint (tests point this
    /// at a stub server).
    pub fn with_endpoint(
        tokeninfo_url: impl Into<String>,
        expected_audience: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokeninfo_url: tokeninfo_url.into(),
            expected_audience: expected_audience.into(),
        }
    }

    fn unauthorized() -> Error {
        Error::Unauthorized("credential verification failed".to_string())
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity> {
        if credential.trim().is_empty() {
            return Err(Self::unauthorized());
        }

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|_| Self::unauthorized())?;

        if !response.status().is_success() {
            debug!(
                subsystem = "auth",
                status = %response.status(),
                "Token verification rejected upstream"
            );
            return Err(Self::unauthorized());
        }

        let info: TokenInfo = response.json().await.map_err(|_| Self::unauthorized())?;

        if info.aud != self.expected_audience || info.sub.is_empty() {
            return Err(Self::unauthorized());
        }

        Ok(VerifiedIdentity {
            subject: info.sub,
            email: info.email,
            name: info.name,
            picture: info.picture,
        })
    }
}

// =============================================================================
// REQUEST EXTRACTOR
// =============================================================================

/// Extractor for authenticated requests: verifies the bearer credential
/// and resolves the subject's stored plan tier (free when no account
/// row exists yet).
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub plan: PlanTier,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let identity = state
            .verifier
            .verify(token)
            .await
            .map_err(|_| ApiError::Unauthorized("Authentication required".to_string()))?;

        let plan = state.users.plan_for(&identity.subject).await?;

        Ok(CurrentUser {
            user_id: identity.subject,
            email: identity.email,
            name: identity.name,
            picture: identity.picture,
            plan,
        })
    }
}
