//! Bearer token minting and verification.
//!
//! Tokens are self-contained HS256 JWTs: `{sub, iat, exp}` signed with the
//! deployment secret. Validity is signature + expiry only; there is no
//! server-side record to revoke. The admin referenced by `sub` is
//! re-resolved from the store on every request, so a deleted admin loses
//! access before the token expires.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use orderdesk_core::AdminId;

/// Bearer token lifetime: 3 hours.
pub const TOKEN_TTL_SECS: i64 = 3 * 60 * 60;

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin ID the token was issued to.
    pub sub: i64,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Mint a bearer token for an admin at the given instant.
///
/// Two mints for the same admin at different instants produce different
/// tokens (`iat` differs).
///
/// # Errors
///
/// Returns an error if signing fails.
pub fn mint(
    admin_id: AdminId,
    issued_at: DateTime<Utc>,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: admin_id.as_i64(),
        iat: issued_at.timestamp(),
        exp: issued_at.timestamp() + TOKEN_TTL_SECS,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Verify a bearer token's signature and expiry, returning its claims.
///
/// # Errors
///
/// Returns an error if the token is malformed, the signature doesn't match,
/// or the token is expired.
pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &[u8] = b"J2vR8qLw5xTz1nYfKb3MhUc7EdGp0AsW";

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let now = Utc::now();
        let token = mint(AdminId::new(42), now, SECRET).unwrap();

        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + TOKEN_TTL_SECS);
    }

    #[test]
    fn test_distinct_instants_yield_distinct_tokens() {
        let now = Utc::now();
        let t1 = mint(AdminId::new(1), now, SECRET).unwrap();
        let t2 = mint(AdminId::new(1), now + Duration::seconds(1), SECRET).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Issued far enough in the past that the default leeway can't save it
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 3600);
        let token = mint(AdminId::new(1), issued, SECRET).unwrap();

        let err = verify(&token, SECRET).unwrap_err();
        assert_eq!(
            err.kind(),
            &jsonwebtoken::errors::ErrorKind::ExpiredSignature
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = mint(AdminId::new(1), Utc::now(), SECRET).unwrap();
        assert!(verify(&token, b"Qx9ZpB4tKm2VdH7cRj6NwEy3UgfL8oAi").is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(verify("not-a-token", SECRET).is_err());
        assert!(verify("", SECRET).is_err());
    }
}
