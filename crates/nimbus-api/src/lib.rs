//! # nimbus-api
//!
//! HTTP server for the Nimbus sync backend: Google-token
//! authentication, quota-gated note sync, billing, the assistant chat
//! proxy, and health reporting, assembled over trait-object state so
//! the whole surface is testable against in-memory fakes.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod services;
pub mod state;
pub mod test_support;

pub use auth::{CurrentUser, GoogleTokenVerifier};
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
