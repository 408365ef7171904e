//! Session record repository (session auth strategy).
//!
//! Expiry is passive: records carry a timestamp that is compared at read
//! time. Expired rows found during a read are removed opportunistically;
//! there is no background sweeper.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use orderdesk_core::AdminId;

use super::RepositoryError;
use crate::models::AuthSession;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    admin_id: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for AuthSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            admin_id: AdminId::new(row.admin_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Repository for session record database operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a freshly issued session record.
    ///
    /// A single `INSERT`: issuance leaves no partial state behind if the
    /// request is aborted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, session: &AuthSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO auth_session (id, admin_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&session.id)
        .bind(session.admin_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Look up a session that is still valid as of `now`.
    ///
    /// An absent or expired record yields `None` - to the caller an expired
    /// session is indistinguishable from one that never existed. Expired
    /// rows are deleted on the way out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_valid(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthSession>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, admin_id, created_at, expires_at
            FROM auth_session
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session = AuthSession::from(row);
        if session.is_expired(now) {
            self.delete(&session.id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Delete a session record, idempotently.
    ///
    /// Deleting an absent record is success: revocation of something that
    /// is already gone has nothing left to do.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM auth_session WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
