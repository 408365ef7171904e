//! Authentication service errors.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials or artifact did not resolve to an admin.
    ///
    /// Deliberately cause-free: unknown email, wrong password, bad
    /// signature, expired artifact and missing admin all land here so
    /// nothing downstream can distinguish them.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing or malformed login/create fields.
    #[error("{0}")]
    InvalidInput(String),

    /// Admin create with an email that is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Password hashing infrastructure failure.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Token signing failure (misconfigured secret, etc.).
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
