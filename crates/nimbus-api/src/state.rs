//! Shared application state.

use std::sync::Arc;

use nimbus_core::{ChatBackend, IdentityVerifier, NoteRepository, PlanPolicy, UserRepository};

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers. Everything behind a trait
/// object so tests can swap in in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteRepository>,
    pub users: Arc<dyn UserRepository>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub chat: Arc<dyn ChatBackend>,
    pub policy: PlanPolicy,
    /// Rate limiter for the AI chat route (None when disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}
