//! Authentication route handlers: login, account bootstrap, logout and the
//! who-am-I check.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, SESSION_COOKIE_NAME, extract_artifact};
use crate::models::CurrentAdmin;
use crate::services::auth::{IssuedAuth, SESSION_TTL_SECS};
use crate::state::AppState;

/// Login / create-account request body.
///
/// Fields are optional so that missing ones produce our own 400 body
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    /// Admin email (login handle).
    pub email: Option<String>,
    /// Admin password.
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn fields(self) -> (String, String) {
        (
            self.email.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }
}

/// Authenticate an admin and issue an artifact.
///
/// POST /auth/login
///
/// Bearer deployments return the token in the body; session deployments
/// set the session cookie and return no token material.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    let (email, password) = body.fields();
    let (admin, issued) = state.auth().login(&email, &password).await?;
    let principal = CurrentAdmin::from(&admin);

    tracing::info!(admin_id = %admin.id, "admin logged in");

    match issued {
        IssuedAuth::Bearer { token } => Ok(Json(json!({
            "status": "success",
            "admin": principal,
            "token": token,
        }))
        .into_response()),
        IssuedAuth::Session { session_id } => {
            let jar = jar.add(session_cookie(&session_id, state.config().is_secure()));
            Ok((
                jar,
                Json(json!({
                    "status": "success",
                    "admin": principal,
                })),
            )
                .into_response())
        }
    }
}

/// Bootstrap an admin account.
///
/// POST /auth/create
///
/// Unprotected: this is how the first account gets bootstrapped. Deploy
/// behind a trusted network.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    let (email, password) = body.fields();
    let admin = state.auth().create_admin(&email, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "admin": CurrentAdmin::from(&admin),
        })),
    )
        .into_response())
}

/// Log out, revoking the presented artifact where possible.
///
/// POST /auth/logout
///
/// Always answers 200: an invalid, expired or missing artifact is treated
/// as already-logged-out. The session cookie is cleared either way.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if let Some(artifact) = extract_artifact(&headers)
        && let Err(err) = state.auth().revoke(&artifact).await
    {
        // Must not block logout; the client clears its state regardless.
        tracing::warn!(error = %err, "logout revocation failed");
    }

    let jar = jar.remove(clear_session_cookie());
    (jar, Json(json!({ "status": "success" }))).into_response()
}

/// Report the authenticated principal for the presented artifact.
///
/// GET /api/admin/check
///
/// The client session manager calls this on load to settle its state.
pub async fn check(RequireAdminAuth(admin): RequireAdminAuth) -> Json<serde_json::Value> {
    Json(json!({
        "status": "success",
        "isAuthenticated": true,
        "admin": admin,
    }))
}

/// Build the session cookie for a freshly issued session.
fn session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_owned()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Build the removal cookie sent on logout.
fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("sid-1", true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "sid-1");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_TTL_SECS))
        );
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
