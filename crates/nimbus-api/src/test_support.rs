//! In-memory fakes for the core traits.
//!
//! Always compiled (not `#[cfg(test)]`) so integration tests in
//! `tests/` can drive the full router without Postgres, Google, or the
//! AI provider.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use nimbus_core::{
    note::sort_for_listing, ChatBackend, ChatTurn, Error, IdentityVerifier, NoteRecord,
    NoteRepository, PlanPolicy, PlanTier, Result, UserAccount, UserRepository, VerifiedIdentity,
};

use crate::state::AppState;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Vec-backed note store with the same owner-scoping rules as the
/// Postgres repository.
#[derive(Default)]
pub struct InMemoryNoteRepository {
    notes: Mutex<Vec<NoteRecord>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn list(&self, owner_id: &str) -> Result<Vec<NoteRecord>> {
        let notes = self.notes.lock().unwrap();
        let mut mine: Vec<NoteRecord> = notes
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        sort_for_listing(&mut mine);
        Ok(mine)
    }

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<NoteRecord>> {
        let notes = self.notes.lock().unwrap();
        Ok(notes
            .iter()
            .find(|n| n.id == id && n.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_local_id(
        &self,
        owner_id: &str,
        local_id: &str,
    ) -> Result<Option<NoteRecord>> {
        let notes = self.notes.lock().unwrap();
        Ok(notes
            .iter()
            .find(|n| n.owner_id == owner_id && n.local_id.as_deref() == Some(local_id))
            .cloned())
    }

    async fn insert(&self, note: &NoteRecord) -> Result<()> {
        self.notes.lock().unwrap().push(note.clone());
        Ok(())
    }

    async fn update(&self, note: &NoteRecord) -> Result<()> {
        let mut notes = self.notes.lock().unwrap();
        match notes
            .iter_mut()
            .find(|n| n.id == note.id && n.owner_id == note.owner_id)
        {
            Some(slot) => {
                *slot = note.clone();
                Ok(())
            }
            None => Err(Error::NoteNotFound(note.id)),
        }
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()> {
        self.notes
            .lock()
            .unwrap()
            .retain(|n| !(n.id == id && n.owner_id == owner_id));
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// HashMap-backed user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<String, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert_login(&self, identity: &VerifiedIdentity) -> Result<UserAccount> {
        let mut accounts = self.accounts.lock().unwrap();
        let now = Utc::now();
        let account = accounts
            .entry(identity.subject.clone())
            .and_modify(|a| {
                a.email = identity.email.clone();
                a.name = identity.name.clone();
                a.picture = identity.picture.clone();
                a.last_login_at = now;
            })
            .or_insert_with(|| UserAccount {
                user_id: identity.subject.clone(),
                email: identity.email.clone(),
                name: identity.name.clone(),
                picture: identity.picture.clone(),
                plan: PlanTier::Free,
                created_at: now,
                last_login_at: now,
                pro_activated_at: None,
            });
        Ok(account.clone())
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserAccount>> {
        Ok(self.accounts.lock().unwrap().get(user_id).cloned())
    }

    async fn plan_for(&self, user_id: &str) -> Result<PlanTier> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(user_id)
            .map(|a| a.plan)
            .unwrap_or(PlanTier::Free))
    }

    async fn upgrade_to_pro(&self, user_id: &str) -> Result<UserAccount> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))?;
        account.plan = PlanTier::Pro;
        account.pro_activated_at.get_or_insert_with(Utc::now);
        Ok(account.clone())
    }
}

// =============================================================================
// IDENTITY VERIFIER
// =============================================================================

/// Verifier that accepts a fixed set of tokens.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, VerifiedIdentity>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token that verifies to the given subject.
    pub fn with_token(mut self, token: &str, subject: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            VerifiedIdentity {
                subject: subject.to_string(),
                email: format!("{}@example.com", subject),
                name: subject.to_string(),
                picture: String::new(),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity> {
        self.tokens
            .get(credential)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("credential verification failed".to_string()))
    }
}

// =============================================================================
// CHAT BACKEND
// =============================================================================

/// Chat backend that replays a scripted sequence of outcomes and
/// counts invocations.
#[derive(Default)]
pub struct ScriptedChatBackend {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
}

impl ScriptedChatBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_with(self, reply: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    pub fn fail_with(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(Error::Provider(message.to_string())));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for ScriptedChatBackend {
    async fn chat(&self, _message: &str, _history: &[ChatTurn]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Provider("script exhausted".to_string())))
    }
}

// =============================================================================
// STATE BUILDER
// =============================================================================

/// AppState over fresh fakes: one valid token ("good-token" →
/// "subject-1"), small free-plan ceilings, rate limiting off.
pub fn test_state() -> AppState {
    test_state_with(
        StaticVerifier::new().with_token("good-token", "subject-1"),
        ScriptedChatBackend::new(),
        PlanPolicy::new(100, 10_000, 5 * 1024 * 1024),
    )
}

/// AppState with explicit collaborators.
pub fn test_state_with(
    verifier: StaticVerifier,
    chat: ScriptedChatBackend,
    policy: PlanPolicy,
) -> AppState {
    AppState {
        notes: Arc::new(InMemoryNoteRepository::new()),
        users: Arc::new(InMemoryUserRepository::new()),
        verifier: Arc::new(verifier),
        chat: Arc::new(chat),
        policy,
        rate_limiter: None,
    }
}
