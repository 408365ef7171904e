//! Client errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur in the API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request as unauthenticated.
    #[error("not authenticated")]
    Unauthorized,

    /// Artifact persistence failed.
    #[error("artifact store error: {0}")]
    Store(#[from] StoreError),

    /// The server answered with something we don't know how to handle.
    #[error("unexpected response status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}
