//! Note synchronization: the quota-gated upsert orchestration.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use nimbus_core::{
    check_write, Error, NoteRecord, NoteRepository, PlanLimits, PlanPolicy, PlanTier, Result,
    SaveNoteRequest, UserRepository, WriteDecision,
};

/// Result of a successful save: the record's id plus the plan snapshot
/// the client uses to refresh its quota display.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub id: Uuid,
    pub plan: PlanTier,
    pub limits: PlanLimits,
}

/// Orchestrates the save path: normalize, resolve update-vs-create,
/// quota-check, then write.
///
/// The quota check reads the owner's note set and the write lands in a
/// separate step, so two concurrent saves near a ceiling can both pass
/// and transiently exceed a count or storage limit. That race is
/// accepted: the ceilings are best-effort product limits, while the
/// correctness-critical localId collision is covered by the store's
/// partial unique index.
#[derive(Clone)]
pub struct SyncService {
    notes: Arc<dyn NoteRepository>,
    users: Arc<dyn UserRepository>,
    policy: PlanPolicy,
}

impl SyncService {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        users: Arc<dyn UserRepository>,
        policy: PlanPolicy,
    ) -> Self {
        Self {
            notes,
            users,
            policy,
        }
    }

    /// Save a note for the owner, creating or updating per the id /
    /// localId resolution rules.
    pub async fn save(&self, owner_id: &str, input: SaveNoteRequest) -> Result<SaveOutcome> {
        // An explicit id must resolve; a malformed or unknown id fails
        // the whole operation before any quota work, never a silent
        // fallback to create.
        let target = match &input.id {
            Some(raw) => {
                let id = Uuid::parse_str(raw)
                    .map_err(|_| Error::InvalidInput(format!("Malformed note id: {}", raw)))?;
                let existing = self
                    .notes
                    .get(owner_id, id)
                    .await?
                    .ok_or(Error::NoteNotFound(id))?;
                Some(existing)
            }
            None => match input.local_id.as_deref().filter(|l| !l.is_empty()) {
                Some(local_id) => self.notes.find_by_local_id(owner_id, local_id).await?,
                None => None,
            },
        };

        let candidate = input.normalize(
            owner_id,
            target.as_ref().map(|n| n.id).unwrap_or_else(Uuid::new_v4),
        );

        let plan = self.users.plan_for(owner_id).await?;
        let limits = self.policy.limits_for(plan);
        let existing = self.notes.list(owner_id).await?;

        if let WriteDecision::Deny(denial) = check_write(plan, &limits, &candidate, &existing) {
            debug!(
                subsystem = "sync",
                op = "save",
                code = denial.code,
                "Write denied by plan quota"
            );
            return Err(Error::QuotaExceeded(denial));
        }

        let is_update = target.is_some();
        if is_update {
            self.notes.update(&candidate).await?;
        } else {
            self.notes.insert(&candidate).await?;
        }

        debug!(
            subsystem = "sync",
            op = "save",
            note_id = %candidate.id,
            update = is_update,
            "Note saved"
        );

        Ok(SaveOutcome {
            id: candidate.id,
            plan,
            limits,
        })
    }

    /// All of the owner's notes in listing order.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<NoteRecord>> {
        self.notes.list(owner_id).await
    }

    /// Idempotent delete: missing, foreign, and even unparseable ids
    /// all succeed without touching storage state.
    pub async fn delete(&self, owner_id: &str, raw_id: &str) -> Result<()> {
        match Uuid::parse_str(raw_id) {
            Ok(id) => self.notes.delete(owner_id, id).await,
            Err(_) => Ok(()),
        }
    }
}
