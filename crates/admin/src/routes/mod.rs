//! HTTP routes for the back office API.
//!
//! `/auth/*` and the health endpoints are open; everything under
//! `/api/admin` sits behind the authentication gate
//! ([`crate::middleware::RequireAdminAuth`]).

pub mod auth;
pub mod orders;

use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Router, extract::State};

use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Unprotected: login, bootstrap account creation, logout (logout
        // must work even with an invalid or expired artifact)
        .route("/auth/login", post(auth::login))
        .route("/auth/create", post(auth::create))
        .route("/auth/logout", post(auth::logout))
        // Protected admin API surface
        .route("/api/admin/check", get(auth::check))
        .route("/api/admin/orders", get(orders::list))
        .route(
            "/api/admin/orders/{order_number}/status",
            patch(orders::update_status),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
