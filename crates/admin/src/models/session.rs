//! Authentication state types: the request principal and session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{AdminId, Email};

use super::admin::Admin;

/// The authenticated principal attached to a request.
///
/// Minimal projection of an [`Admin`]: never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's ID.
    pub id: AdminId,
    /// Admin's email address.
    pub email: Email,
}

impl From<&Admin> for CurrentAdmin {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
        }
    }
}

/// A server-side session record (session auth strategy).
///
/// The `id` is the opaque value the client carries in its cookie. Expiry is
/// fixed at issuance and compared lazily at read time.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Opaque session identifier (256-bit random, base64url).
    pub id: String,
    /// Admin the session belongs to.
    pub admin_id: AdminId,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Whether the session is expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_current_admin_from_admin() {
        let admin = Admin {
            id: AdminId::new(3),
            email: Email::parse("a@x.com").unwrap(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let current = CurrentAdmin::from(&admin);
        assert_eq!(current.id, admin.id);
        assert_eq!(current.email, admin.email);
    }

    #[test]
    fn test_current_admin_serializes_without_hash() {
        let admin = Admin {
            id: AdminId::new(3),
            email: Email::parse("a@x.com").unwrap(),
            password_hash: "supersecrethash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&CurrentAdmin::from(&admin)).unwrap();
        assert_eq!(json, r#"{"id":3,"email":"a@x.com"}"#);
        assert!(!json.contains("supersecrethash"));
    }

    #[test]
    fn test_session_expiry_is_inclusive() {
        let now = Utc::now();
        let session = AuthSession {
            id: "sid".to_string(),
            admin_id: AdminId::new(1),
            created_at: now,
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
