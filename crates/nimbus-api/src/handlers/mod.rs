//! HTTP request handlers, grouped by surface area.

pub mod auth;
pub mod billing;
pub mod chat;
pub mod health;
pub mod notes;
