//! Database operations for the back office `SQLite` store.
//!
//! ## Tables
//!
//! - `admin_user` - Admin accounts (email + password hash)
//! - `auth_session` - Server-side session records (session auth strategy)
//! - `orders` - Order documents the back office fronts
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/admin/migrations/` and run at
//! startup (and at test-pool setup) via [`MIGRATOR`].

pub mod admins;
pub mod orders;
pub mod sessions;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use admins::AdminRepository;
pub use orders::OrderRepository;
pub use sessions::SessionRepository;

/// Embedded database migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// In-memory databases (`:memory:`) are pinned to a single never-reaped
/// connection: a `SQLite` in-memory database lives exactly as long as the
/// connection that opened it, so pooling more (or letting the idle reaper
/// close it) would silently discard all data.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();

    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(2)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = create_pool(&secrecy::SecretString::from("sqlite::memory:"))
        .await
        .expect("in-memory pool");
    MIGRATOR.run(&pool).await.expect("migrations");
    pool
}
