//! # nimbus-core
//!
//! Core types, traits, and abstractions for the Nimbus sync backend.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other nimbus crates depend on: the note data model, plan tiers and
//! quota ceilings, the pure quota accounting logic, and the repository /
//! verifier / chat-backend seams implemented elsewhere.

pub mod defaults;
pub mod error;
pub mod note;
pub mod plan;
pub mod quota;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use note::{NoteRecord, SaveNoteRequest};
pub use plan::{PlanLimits, PlanPolicy, PlanTier};
pub use quota::{check_write, LimitType, QuotaDenial, QuotaUsage, WriteDecision};
pub use traits::*;
