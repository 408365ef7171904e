//! Admin account domain type.

use chrono::{DateTime, Utc};

use orderdesk_core::{AdminId, Email};

/// An admin account (domain type).
///
/// Carries the password hash and therefore never leaves the server: request
/// handlers only ever see [`super::CurrentAdmin`]. Not `Serialize` on
/// purpose.
#[derive(Clone)]
pub struct Admin {
    /// Unique admin ID.
    pub id: AdminId,
    /// Admin's email address (login handle, unique).
    pub email: Email,
    /// Argon2 PHC-format hash of the admin's password.
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Admin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let admin = Admin {
            id: AdminId::new(1),
            email: Email::parse("a@x.com").expect("valid email"),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let debug_output = format!("{admin:?}");
        assert!(debug_output.contains("a@x.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("argon2id"));
    }
}
