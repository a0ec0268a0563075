//! Plan quota enforcement for note writes.
//!
//! [`check_write`] is a pure decision over the owner's full current note
//! set: no I/O, no clock. The caller reads state, asks for a decision,
//! then performs the write — the gap between read and write is documented
//! in the service layer, not hidden here.

use serde::Serialize;

use crate::note::NoteRecord;
use crate::plan::{PlanLimits, PlanTier};

/// Machine code for a per-note character limit violation.
pub const CODE_CHAR_LIMIT: &str = "NOTE_CHAR_LIMIT_EXCEEDED";

/// Machine code for a note count limit violation.
pub const CODE_COUNT_LIMIT: &str = "NOTE_COUNT_LIMIT_EXCEEDED";

/// Machine code for a total storage limit violation.
pub const CODE_STORAGE_LIMIT: &str = "STORAGE_LIMIT_EXCEEDED";

/// Which ceiling a denial was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    Chars,
    Notes,
    Storage,
}

/// Usage snapshot for the violated check only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUsage {
    pub used: i64,
    pub limit: i64,
}

/// Structured rejection of a write that would exceed a plan ceiling.
/// Surfaced to the client verbatim so it can render an upgrade prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDenial {
    pub message: String,
    pub code: &'static str,
    pub limit_type: LimitType,
    pub requires_pro: bool,
    pub plan: PlanTier,
    pub limits: PlanLimits,
    pub usage: QuotaUsage,
}

impl std::fmt::Display for QuotaDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteDecision {
    Allow,
    Deny(QuotaDenial),
}

impl WriteDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether writing `candidate` would exceed the owner's plan.
///
/// Checks run in fixed order — char limit, then count limit, then storage
/// limit — and the first violation wins. Sitting exactly at a ceiling is
/// allowed; only exceeding it is denied. Pro is always allowed.
///
/// The candidate counts as an update when it matches an existing record
/// by id, else by `local_id`; updates do not raise the note count and
/// replace (rather than add) their predecessor's storage footprint.
pub fn check_write(
    tier: PlanTier,
    limits: &PlanLimits,
    candidate: &NoteRecord,
    existing: &[NoteRecord],
) -> WriteDecision {
    if tier.is_pro() {
        return WriteDecision::Allow;
    }

    let deny = |message: String, code: &'static str, limit_type: LimitType, usage: QuotaUsage| {
        WriteDecision::Deny(QuotaDenial {
            message,
            code,
            limit_type,
            requires_pro: true,
            plan: tier,
            limits: *limits,
            usage,
        })
    };

    if let Some(max_chars) = limits.max_chars_per_note {
        let chars = candidate.char_count();
        if chars > max_chars {
            return deny(
                format!(
                    "Note exceeds the {} character limit for the {} plan",
                    max_chars, tier
                ),
                CODE_CHAR_LIMIT,
                LimitType::Chars,
                QuotaUsage {
                    used: chars,
                    limit: max_chars,
                },
            );
        }
    }

    let replaced = existing
        .iter()
        .find(|n| n.id == candidate.id)
        .or_else(|| {
            candidate.local_id.as_deref().and_then(|lid| {
                existing
                    .iter()
                    .find(|n| n.local_id.as_deref() == Some(lid))
            })
        });

    if let Some(max_notes) = limits.max_notes {
        let count_after = existing.len() as i64 + i64::from(replaced.is_none());
        if count_after > max_notes {
            return deny(
                format!("The {} plan is limited to {} notes", tier, max_notes),
                CODE_COUNT_LIMIT,
                LimitType::Notes,
                QuotaUsage {
                    used: existing.len() as i64,
                    limit: max_notes,
                },
            );
        }
    }

    if let Some(max_bytes) = limits.max_storage_bytes {
        let current: i64 = existing.iter().map(NoteRecord::approx_size_bytes).sum();
        let projected =
            current - replaced.map_or(0, NoteRecord::approx_size_bytes) + candidate.approx_size_bytes();
        if projected > max_bytes {
            return deny(
                format!(
                    "Saving this note would exceed the {} byte storage limit for the {} plan",
                    max_bytes, tier
                ),
                CODE_STORAGE_LIMIT,
                LimitType::Storage,
                QuotaUsage {
                    used: current,
                    limit: max_bytes,
                },
            );
        }
    }

    WriteDecision::Allow
}
