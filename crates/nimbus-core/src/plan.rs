//! Plan tiers and the quota ceilings attached to them.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Subscription tier governing quota ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

impl PlanTier {
    /// Parse a tier from a stored string. Anything that is not "pro"
    /// normalizes to Free.
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pro" => Self::Pro,
            _ => Self::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    pub fn is_pro(&self) -> bool {
        matches!(self, Self::Pro)
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quota ceilings for a plan. `None` means unbounded and serializes as
/// JSON `null`, which the client renders as "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_notes: Option<i64>,
    pub max_chars_per_note: Option<i64>,
    pub max_storage_bytes: Option<i64>,
}

impl PlanLimits {
    /// All-unbounded limits (the pro plan).
    pub fn unbounded() -> Self {
        Self {
            max_notes: None,
            max_chars_per_note: None,
            max_storage_bytes: None,
        }
    }
}

/// Computes the quota ceilings for a plan tier.
///
/// The free-tier ceilings are configured once at startup; pro is always
/// unbounded. `limits_for` is total — unknown tiers were already
/// normalized to Free by [`PlanTier::from_str_loose`].
#[derive(Debug, Clone)]
pub struct PlanPolicy {
    free: PlanLimits,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self::new(
            defaults::FREE_MAX_NOTES,
            defaults::FREE_MAX_NOTE_CHARS,
            defaults::FREE_MAX_STORAGE_BYTES,
        )
    }
}

impl PlanPolicy {
    pub fn new(max_notes: i64, max_chars_per_note: i64, max_storage_bytes: i64) -> Self {
        Self {
            free: PlanLimits {
                max_notes: Some(max_notes),
                max_chars_per_note: Some(max_chars_per_note),
                max_storage_bytes: Some(max_storage_bytes),
            },
        }
    }

    /// Load free-tier ceilings from environment variables with fallback
    /// to defaults.
    pub fn from_env() -> Self {
        let mut policy = Self::default();

        if let Some(n) = env_ceiling("NIMBUS_FREE_MAX_NOTES") {
            policy.free.max_notes = Some(n);
        }
        if let Some(n) = env_ceiling("NIMBUS_FREE_MAX_NOTE_CHARS") {
            policy.free.max_chars_per_note = Some(n);
        }
        if let Some(n) = env_ceiling("NIMBUS_FREE_MAX_STORAGE_BYTES") {
            policy.free.max_storage_bytes = Some(n);
        }

        policy
    }

    /// Quota ceilings for the given tier.
    pub fn limits_for(&self, tier: PlanTier) -> PlanLimits {
        match tier {
            PlanTier::Pro => PlanLimits::unbounded(),
            PlanTier::Free => self.free,
        }
    }
}

fn env_ceiling(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    parse_ceiling(name, &raw)
}

/// Parse a configured ceiling. Unparseable and non-positive values are
/// both rejected with a warning so misconfiguration is visible.
fn parse_ceiling(name: &str, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Some(n),
        Ok(n) => {
            tracing::warn!(name, value = n, "Ignoring non-positive ceiling, using default");
            None
        }
        Err(_) => {
            tracing::warn!(name, value = %raw, "Invalid ceiling, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_from_str_loose() {
        assert_eq!(PlanTier::from_str_loose("pro"), PlanTier::Pro);
        assert_eq!(PlanTier::from_str_loose("PRO"), PlanTier::Pro);
        assert_eq!(PlanTier::from_str_loose(" pro "), PlanTier::Pro);
        assert_eq!(PlanTier::from_str_loose("free"), PlanTier::Free);
        assert_eq!(PlanTier::from_str_loose("premium"), PlanTier::Free);
        assert_eq!(PlanTier::from_str_loose(""), PlanTier::Free);
    }

    #[test]
    fn tier_display() {
        assert_eq!(PlanTier::Free.to_string(), "free");
        assert_eq!(PlanTier::Pro.to_string(), "pro");
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PlanTier::Pro).unwrap(), "\"pro\"");
        assert_eq!(serde_json::to_string(&PlanTier::Free).unwrap(), "\"free\"");
    }

    #[test]
    fn ceiling_accepts_positive_values() {
        assert_eq!(parse_ceiling("CEILING", "250"), Some(250));
        assert_eq!(parse_ceiling("CEILING", " 250 "), Some(250));
    }

    #[test]
    fn ceiling_rejects_zero_negative_and_garbage() {
        assert_eq!(parse_ceiling("CEILING", "0"), None);
        assert_eq!(parse_ceiling("CEILING", "-5"), None);
        assert_eq!(parse_ceiling("CEILING", "lots"), None);
        assert_eq!(parse_ceiling("CEILING", ""), None);
    }

    #[test]
    fn pro_limits_unbounded() {
        let policy = PlanPolicy::default();
        let limits = policy.limits_for(PlanTier::Pro);
        assert_eq!(limits, PlanLimits::unbounded());
    }

    #[test]
    fn free_limits_are_configured_ceilings() {
        let policy = PlanPolicy::new(10, 500, 4096);
        let limits = policy.limits_for(PlanTier::Free);
        assert_eq!(limits.max_notes, Some(10));
        assert_eq!(limits.max_chars_per_note, Some(500));
        assert_eq!(limits.max_storage_bytes, Some(4096));
    }

    #[test]
    fn unbounded_limits_serialize_as_null() {
        let json = serde_json::to_value(PlanLimits::unbounded()).unwrap();
        assert_eq!(json["maxNotes"], serde_json::Value::Null);
        assert_eq!(json["maxCharsPerNote"], serde_json::Value::Null);
        assert_eq!(json["maxStorageBytes"], serde_json::Value::Null);
    }

    #[test]
    fn bounded_limits_serialize_camel_case() {
        let policy = PlanPolicy::new(100, 10_000, 5 * 1024 * 1024);
        let json = serde_json::to_value(policy.limits_for(PlanTier::Free)).unwrap();
        assert_eq!(json["maxNotes"], 100);
        assert_eq!(json["maxCharsPerNote"], 10_000);
        assert_eq!(json["maxStorageBytes"], 5 * 1024 * 1024);
    }
}
