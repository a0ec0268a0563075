//! Business-logic services shared by the HTTP handlers.

pub mod sync;

pub use sync::{SaveOutcome, SyncService};
