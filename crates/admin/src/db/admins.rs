//! Admin account repository.
//!
//! Email uniqueness is enforced by the `UNIQUE` column constraint, not by
//! application-level locking: a racing duplicate insert surfaces as
//! [`RepositoryError::Conflict`] to exactly one caller.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use orderdesk_core::{AdminId, Email};

use super::RepositoryError;
use crate::models::Admin;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminId::new(row.id),
            email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin account database operations.
pub struct AdminRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an admin by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, email, password_hash, created_at, updated_at
            FROM admin_user
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an admin by their email address.
    ///
    /// `Email` is normalized at parse, so the lookup is effectively
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, email, password_hash, created_at, updated_at
            FROM admin_user
            WHERE email = ?1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new admin account.
    ///
    /// The password must already be hashed by the caller; this layer never
    /// sees plaintext.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Admin, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            INSERT INTO admin_user (email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id, email, password_hash, created_at, updated_at
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Delete an admin account by ID.
    ///
    /// Sessions referencing the account are cascade-deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: AdminId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_user WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
