//! Centralized default constants for the Nimbus backend.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// FREE PLAN QUOTAS
// =============================================================================

/// Maximum number of notes on the free plan.
/// Configurable via `NIMBUS_FREE_MAX_NOTES` env var.
pub const FREE_MAX_NOTES: i64 = 100;

/// Maximum characters per note on the free plan.
/// Configurable via `NIMBUS_FREE_MAX_NOTE_CHARS` env var.
pub const FREE_MAX_NOTE_CHARS: i64 = 10_000;

/// Maximum total storage per user on the free plan, in bytes (5 MB).
/// Configurable via `NIMBUS_FREE_MAX_STORAGE_BYTES` env var.
///
/// Storage is accounted as the summed UTF-8 byte size of each note's
/// text fields, not as on-disk footprint.
pub const FREE_MAX_STORAGE_BYTES: i64 = 5 * 1024 * 1024;

// =============================================================================
// NOTE NORMALIZATION
// =============================================================================

/// Title applied when a save request omits the title or sends it empty.
pub const NOTE_TITLE: &str = "Untitled Note";

/// Folder applied when a save request omits the folder or sends it empty.
pub const NOTE_FOLDER: &str = "General";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8080;

/// Default rate limit for the AI chat route: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 30;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes (1 MB).
///
/// The largest legitimate payload is a note save; with the free-plan note
/// ceiling at 10k characters this leaves generous headroom for pro users.
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;

// =============================================================================
// DATABASE
// =============================================================================

/// Interval between startup connection attempts, in seconds.
pub const DB_CONNECT_RETRY_SECS: u64 = 5;

/// Maximum startup connection attempts before giving up.
pub const DB_CONNECT_MAX_ATTEMPTS: u32 = 60;

// =============================================================================
// AI PROVIDER
// =============================================================================

/// Base URL of the generative-language provider.
pub const AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default preferred generation model.
/// Configurable via `NIMBUS_AI_MODEL` env var.
pub const AI_MODEL: &str = "gemini-2.5-flash";

/// Static fallback models tried when the preferred model fails.
///
/// Kept deliberately broad across provider generations: the provider
/// retires model names on its own schedule, and discovery may be
/// unavailable exactly when a request needs to go out.
pub const AI_FALLBACK_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-flash-latest",
    "gemini-pro-latest",
];

/// Provider API versions, in fixed preference order.
pub const AI_API_VERSIONS: &[&str] = &["v1beta", "v1"];

/// TTL for the discovered-model cache, in seconds (10 minutes).
pub const MODEL_CACHE_TTL_SECS: u64 = 600;

/// Maximum ranked candidates attempted per chat request.
pub const AI_CANDIDATE_CAP: usize = 10;

/// Trailing window of conversation turns forwarded to the provider.
pub const CHAT_HISTORY_TURNS: usize = 12;

/// Timeout for a single generation attempt, in seconds.
pub const CHAT_TIMEOUT_SECS: u64 = 30;

/// Neutral assistant name substituted for provider/vendor mentions.
pub const ASSISTANT_NAME: &str = "Nimbus";

// =============================================================================
// IDENTITY
// =============================================================================

/// Google tokeninfo endpoint used to verify ID tokens.
pub const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
