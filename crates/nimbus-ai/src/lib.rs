//! # nimbus-ai
//!
//! Generative-language provider client for the Nimbus assistant.
//!
//! The provider churns model names and API versions on its own
//! schedule, so the client never pins a single target: each request
//! ranks a candidate list (configured model, static fallbacks, cached
//! catalog discoveries) and walks the candidates × API versions cross
//! product until one attempt returns a usable reply. Replies are
//! sanitized so vendor names never reach the client.

pub mod catalog;
pub mod client;
pub mod ranking;
pub mod sanitize;

pub use catalog::{ModelCache, ModelCatalog};
pub use client::{AttemptTarget, ChatClient};
pub use ranking::rank_candidates;
pub use sanitize::{sanitize_reply, vendor_pattern};
