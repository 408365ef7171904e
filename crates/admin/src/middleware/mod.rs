//! HTTP middleware for the back office API.

pub mod auth;

pub use auth::{RequireAdminAuth, SESSION_COOKIE_NAME, extract_artifact};
