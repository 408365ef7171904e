//! Authentication service.
//!
//! One service fronts the whole credential lifecycle: account creation,
//! password verification, artifact issuance, per-request resolution and
//! revocation. The two artifact strategies (stateless bearer tokens,
//! server-side sessions) are unified behind [`AuthArtifact`] and a single
//! [`AuthService::resolve`] dispatch; which one a deployment issues is
//! decided by [`AuthStrategy`] in config.

mod error;
pub mod token;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use orderdesk_core::{AdminId, Email};

use crate::config::{AuthConfig, AuthStrategy};
use crate::db::{AdminRepository, SessionRepository};
use crate::models::{Admin, AuthSession, CurrentAdmin};

/// Session record lifetime: 8 hours (fixed, not sliding).
pub const SESSION_TTL_SECS: i64 = 8 * 60 * 60;

/// An authentication artifact as presented by a request.
///
/// Exactly one principal resolves per valid artifact; everything else is a
/// uniform rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthArtifact {
    /// Token from an `Authorization: Bearer ...` header.
    Bearer(String),
    /// Session identifier from the session cookie.
    Session(String),
}

/// A freshly issued authentication artifact, ready for transport.
#[derive(Debug, Clone)]
pub enum IssuedAuth {
    /// Bearer deployments return the token in the login response body.
    Bearer {
        /// The signed token.
        token: String,
    },
    /// Session deployments set a cookie; the body carries no token material.
    Session {
        /// The opaque session identifier.
        session_id: String,
    },
}

/// Fixed argon2 hash used to burn comparable work when the email is
/// unknown, so the unknown-email path doesn't return conspicuously faster
/// than the wrong-password path. Hygiene only; uniform error messaging is
/// the actual contract.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("orderdesk-dummy-credential").unwrap_or_default());

/// Authentication service.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
    sessions: SessionRepository<'a>,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, config: &'a AuthConfig) -> Self {
        Self {
            admins: AdminRepository::new(pool),
            sessions: SessionRepository::new(pool),
            config,
        }
    }

    /// Create a new admin account.
    ///
    /// The password is hashed before anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` if email or password is missing or
    /// malformed, `AuthError::EmailTaken` if the email is already
    /// registered.
    pub async fn create_admin(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required".to_owned(),
            ));
        }

        let email = Email::parse(email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let password_hash = hash_password(password)?;

        match self.admins.create(&email, &password_hash).await {
            Ok(admin) => {
                tracing::info!(admin_id = %admin.id, "admin account created");
                Ok(admin)
            }
            Err(crate::db::RepositoryError::Conflict(_)) => Err(AuthError::EmailTaken),
            Err(other) => Err(other.into()),
        }
    }

    /// Verify credentials and issue an artifact for the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` on missing fields and
    /// `AuthError::InvalidCredentials` for every other failure - unknown
    /// email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Admin, IssuedAuth), AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required".to_owned(),
            ));
        }

        let admin = match Email::parse(email) {
            Ok(parsed) => self.admins.get_by_email(&parsed).await?,
            Err(_) => None,
        };

        let Some(admin) = admin else {
            let _ = verify_password(password, &DUMMY_HASH);
            tracing::debug!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &admin.password_hash) {
            tracing::debug!(admin_id = %admin.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issue(&admin).await?;
        Ok((admin, issued))
    }

    /// Issue an artifact for an already-verified admin.
    ///
    /// Issuance is a single write (session) or pure computation (bearer);
    /// an aborted request leaves no partial state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails or
    /// `AuthError::Repository` if the session insert fails.
    pub async fn issue(&self, admin: &Admin) -> Result<IssuedAuth, AuthError> {
        match self.config.strategy {
            AuthStrategy::Bearer => {
                let token = token::mint(admin.id, Utc::now(), self.secret())?;
                Ok(IssuedAuth::Bearer { token })
            }
            AuthStrategy::Session => {
                let now = Utc::now();
                let session = AuthSession {
                    id: generate_session_id(),
                    admin_id: admin.id,
                    created_at: now,
                    expires_at: now + Duration::seconds(SESSION_TTL_SECS),
                };
                self.sessions.insert(&session).await?;
                Ok(IssuedAuth::Session {
                    session_id: session.id,
                })
            }
        }
    }

    /// Resolve a presented artifact to the admin it belongs to.
    ///
    /// Bearer tokens are verified (signature + expiry) and then the admin
    /// is re-resolved from the store, so a deleted account loses access
    /// immediately rather than at token expiry. Session identifiers are
    /// looked up with a lazy expiry check and likewise re-resolved; stale
    /// session rows never synthesize a principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for every resolution
    /// failure; the cause only reaches the logs.
    pub async fn resolve(&self, artifact: &AuthArtifact) -> Result<CurrentAdmin, AuthError> {
        match artifact {
            AuthArtifact::Bearer(token) => {
                let claims = token::verify(token, self.secret()).map_err(|err| {
                    tracing::debug!(error = %err, "bearer token rejected");
                    AuthError::InvalidCredentials
                })?;
                let admin = self
                    .admins
                    .get_by_id(AdminId::new(claims.sub))
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;
                Ok(CurrentAdmin::from(&admin))
            }
            AuthArtifact::Session(session_id) => {
                let session = self
                    .sessions
                    .find_valid(session_id, Utc::now())
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;
                let admin = self
                    .admins
                    .get_by_id(session.admin_id)
                    .await?
                    .ok_or(AuthError::InvalidCredentials)?;
                Ok(CurrentAdmin::from(&admin))
            }
        }
    }

    /// Revoke a presented artifact.
    ///
    /// Session: delete the record (idempotent - revoking something already
    /// gone is success). Bearer: nothing to do server-side; the token stays
    /// valid until its natural expiry and logout is a client-side discard.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the session delete fails.
    pub async fn revoke(&self, artifact: &AuthArtifact) -> Result<(), AuthError> {
        match artifact {
            AuthArtifact::Bearer(_) => Ok(()),
            AuthArtifact::Session(session_id) => {
                self.sessions.delete(session_id).await?;
                Ok(())
            }
        }
    }

    fn secret(&self) -> &[u8] {
        self.config.secret.expose_secret().as_bytes()
    }
}

/// Hash a password into an argon2 PHC string.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password candidate against a PHC hash.
fn verify_password(candidate: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Generate a session identifier: 256 random bits, base64url without padding.
fn generate_session_id() -> String {
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    use crate::db::test_pool;

    fn config(strategy: AuthStrategy) -> AuthConfig {
        AuthConfig {
            strategy,
            secret: SecretString::from("J2vR8qLw5xTz1nYfKb3MhUc7EdGp0AsW"),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_session_ids_are_unique_and_opaque() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43); // 32 bytes, base64url, no padding
    }

    #[tokio::test]
    async fn test_create_admin_hashes_password() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);

        let admin = auth.create_admin("a@x.com", "secret1").await.unwrap();
        assert_ne!(admin.password_hash, "secret1");
        assert!(admin.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_create_admin_rejects_missing_fields() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);

        assert!(matches!(
            auth.create_admin("", "secret1").await.unwrap_err(),
            AuthError::InvalidInput(_)
        ));
        assert!(matches!(
            auth.create_admin("a@x.com", "").await.unwrap_err(),
            AuthError::InvalidInput(_)
        ));
        assert!(matches!(
            auth.create_admin("not-an-email", "secret1").await.unwrap_err(),
            AuthError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_create_admin_duplicate_email_is_taken() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);

        auth.create_admin("a@x.com", "secret1").await.unwrap();
        let err = auth.create_admin("a@x.com", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);
        auth.create_admin("a@x.com", "secret1").await.unwrap();

        let wrong_password = auth.login("a@x.com", "wrong").await.unwrap_err();
        let unknown_email = auth.login("b@x.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        // Identical rendering: callers can't tell the two apart
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_session_login_resolve_revoke_cycle() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);
        auth.create_admin("a@x.com", "secret1").await.unwrap();

        let (admin, issued) = auth.login("a@x.com", "secret1").await.unwrap();
        let IssuedAuth::Session { session_id } = issued else {
            panic!("session strategy must issue a session");
        };

        let artifact = AuthArtifact::Session(session_id);
        let principal = auth.resolve(&artifact).await.unwrap();
        assert_eq!(principal.id, admin.id);
        assert_eq!(principal.email.as_str(), "a@x.com");

        auth.revoke(&artifact).await.unwrap();
        assert!(matches!(
            auth.resolve(&artifact).await.unwrap_err(),
            AuthError::InvalidCredentials
        ));

        // Revoking again is still success
        auth.revoke(&artifact).await.unwrap();
    }

    #[tokio::test]
    async fn test_bearer_login_resolves_and_survives_revoke() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Bearer);
        let auth = AuthService::new(&pool, &cfg);
        auth.create_admin("a@x.com", "secret1").await.unwrap();

        let (admin, issued) = auth.login("a@x.com", "secret1").await.unwrap();
        let IssuedAuth::Bearer { token } = issued else {
            panic!("bearer strategy must issue a token");
        };

        let artifact = AuthArtifact::Bearer(token);
        assert_eq!(auth.resolve(&artifact).await.unwrap().id, admin.id);

        // Bearer revocation is a no-op: the token keeps resolving until it
        // expires naturally.
        auth.revoke(&artifact).await.unwrap();
        assert!(auth.resolve(&artifact).await.is_ok());
    }

    #[tokio::test]
    async fn test_bearer_resolution_rechecks_the_store() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Bearer);
        let auth = AuthService::new(&pool, &cfg);
        let admin = auth.create_admin("a@x.com", "secret1").await.unwrap();

        let (_, issued) = auth.login("a@x.com", "secret1").await.unwrap();
        let IssuedAuth::Bearer { token } = issued else {
            panic!("bearer strategy must issue a token");
        };
        let artifact = AuthArtifact::Bearer(token);
        assert!(auth.resolve(&artifact).await.is_ok());

        // Deleting the admin invalidates an otherwise-valid token
        AdminRepository::new(&pool).delete(admin.id).await.unwrap();
        assert!(matches!(
            auth.resolve(&artifact).await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_stale_session_never_yields_principal() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);
        let admin = auth.create_admin("a@x.com", "secret1").await.unwrap();

        let (_, issued) = auth.login("a@x.com", "secret1").await.unwrap();
        let IssuedAuth::Session { session_id } = issued else {
            panic!("session strategy must issue a session");
        };
        let artifact = AuthArtifact::Session(session_id);

        // Admin disappears out from under a live session (cascade removes
        // the record; either way resolution must fail, not synthesize a
        // principal from stale data).
        AdminRepository::new(&pool).delete(admin.id).await.unwrap();
        assert!(matches!(
            auth.resolve(&artifact).await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_concurrent_logins_are_independent() {
        let pool = test_pool().await;
        let cfg = config(AuthStrategy::Session);
        let auth = AuthService::new(&pool, &cfg);
        auth.create_admin("a@x.com", "secret1").await.unwrap();

        let (_, first) = auth.login("a@x.com", "secret1").await.unwrap();
        let (_, second) = auth.login("a@x.com", "secret1").await.unwrap();

        let (IssuedAuth::Session { session_id: s1 }, IssuedAuth::Session { session_id: s2 }) =
            (first, second)
        else {
            panic!("session strategy must issue sessions");
        };
        assert_ne!(s1, s2);

        // Revoking one does not touch the other
        auth.revoke(&AuthArtifact::Session(s1)).await.unwrap();
        assert!(auth.resolve(&AuthArtifact::Session(s2)).await.is_ok());
    }
}
