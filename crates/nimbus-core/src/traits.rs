//! Core traits for nimbus abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability: the
//! Postgres repositories in nimbus-db, the Google verifier and the
//! generative-language client in nimbus-ai/nimbus-api in production,
//! and in-memory fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::note::NoteRecord;
use crate::plan::PlanTier;

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity claims extracted from a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Stable subject identifier assigned by the identity provider.
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: String,
}

/// Verifies an opaque bearer credential against the identity provider.
///
/// Implementations must treat every failure mode (transport error,
/// non-success status, audience mismatch, missing subject) as an
/// unauthorized condition without revealing which check failed.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a credential and return the identity it attests to.
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// A stored user account with its plan tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Identity-provider subject, the primary key for all user data.
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub plan: PlanTier,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_activated_at: Option<DateTime<Utc>>,
}

/// Repository for user accounts and plan tiers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Record a successful login: create the account on first sight
    /// (plan defaults to free), refresh profile fields and
    /// `last_login_at` on every subsequent login.
    async fn upsert_login(&self, identity: &VerifiedIdentity) -> Result<UserAccount>;

    /// Fetch an account by subject.
    async fn get(&self, user_id: &str) -> Result<Option<UserAccount>>;

    /// Plan tier for a subject, defaulting to free when no account
    /// row exists yet.
    async fn plan_for(&self, user_id: &str) -> Result<PlanTier>;

    /// Switch the account to the pro plan. Sets `pro_activated_at` on
    /// the first upgrade only; upgrading twice is a no-op.
    async fn upgrade_to_pro(&self, user_id: &str) -> Result<UserAccount>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note CRUD operations. Every method is scoped by
/// owner; an id belonging to another owner behaves as if it did not
/// exist.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes for an owner, ordered by `last_modified` descending,
    /// tie-broken by `updated_at` descending.
    async fn list(&self, owner_id: &str) -> Result<Vec<NoteRecord>>;

    /// Fetch a note by id if it exists and belongs to the owner.
    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<NoteRecord>>;

    /// Fetch the owner's note carrying the given client idempotency key.
    async fn find_by_local_id(&self, owner_id: &str, local_id: &str)
        -> Result<Option<NoteRecord>>;

    /// Insert a new note.
    async fn insert(&self, note: &NoteRecord) -> Result<()>;

    /// Replace the mutable fields of an existing note, matched by
    /// (id, owner).
    async fn update(&self, note: &NoteRecord) -> Result<()>;

    /// Delete a note when both id and owner match; silently does
    /// nothing otherwise (idempotent).
    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()>;

    /// Probe the underlying store, for health reporting.
    async fn health_check(&self) -> Result<()>;
}

// =============================================================================
// CHAT BACKEND
// =============================================================================

/// One prior turn of an assistant conversation, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Client-side role label; anything other than "assistant" is
    /// forwarded to the provider as a user turn.
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Produces an assistant reply from a message and bounded history.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate a reply. Implementations own their fallback strategy;
    /// an error means every avenue was exhausted and the caller should
    /// report the service unavailable without upstream detail.
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String>;
}
