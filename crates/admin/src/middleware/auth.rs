//! Authentication gate for protected routes.
//!
//! Per request the gate walks a small state machine: no artifact →
//! immediate rejection without touching the store; artifact present →
//! resolve it to a principal or reject. Every rejection is the same 401
//! body - whether the artifact was missing, malformed, expired, forged or
//! referenced a deleted admin is visible only in debug logs.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::models::CurrentAdmin;
use crate::services::auth::AuthArtifact;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "orderdesk_session";

/// The one client-facing message for every gate rejection.
pub(crate) const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// Extractor that requires an authenticated admin.
///
/// Handlers behind the gate receive the resolved principal and never
/// re-derive authentication themselves.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(artifact) = extract_artifact(&parts.headers) else {
            tracing::debug!(path = %parts.uri.path(), "request carried no auth artifact");
            return Err(AppError::Unauthorized(AUTH_REQUIRED_MESSAGE.to_owned()));
        };

        match state.auth().resolve(&artifact).await {
            Ok(admin) => Ok(Self(admin)),
            Err(err) => {
                tracing::debug!(path = %parts.uri.path(), error = %err, "auth artifact rejected");
                Err(AppError::Unauthorized(AUTH_REQUIRED_MESSAGE.to_owned()))
            }
        }
    }
}

/// Pull the auth artifact off a request, if any.
///
/// The `Authorization` header wins over the session cookie; a request
/// carrying neither has no artifact.
#[must_use]
pub fn extract_artifact(headers: &HeaderMap) -> Option<AuthArtifact> {
    if let Some(value) = headers.get(header::AUTHORIZATION)
        && let Ok(value) = value.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(AuthArtifact::Bearer(token.to_owned()));
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| AuthArtifact::Session(cookie.value().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_artifact() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(
            extract_artifact(&headers),
            Some(AuthArtifact::Bearer("abc.def.ghi".to_owned()))
        );
    }

    #[test]
    fn test_extract_session_artifact() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("orderdesk_session=sid-123; other=x"),
        );

        assert_eq!(
            extract_artifact(&headers),
            Some(AuthArtifact::Session("sid-123".to_owned()))
        );
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("orderdesk_session=sid"),
        );

        assert_eq!(
            extract_artifact(&headers),
            Some(AuthArtifact::Bearer("tok".to_owned()))
        );
    }

    #[test]
    fn test_no_artifact() {
        assert_eq!(extract_artifact(&HeaderMap::new()), None);

        // A non-bearer Authorization header is not an artifact
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        assert_eq!(extract_artifact(&headers), None);

        // Unrelated cookies are not artifacts either
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(extract_artifact(&headers), None);
    }
}
