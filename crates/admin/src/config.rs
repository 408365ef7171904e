//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDERDESK_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`)
//! - `ORDERDESK_BASE_URL` - Public URL for the back office API
//! - `ORDERDESK_AUTH_SECRET` - Artifact signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ORDERDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERDESK_PORT` - Listen port (default: 4001)
//! - `ORDERDESK_AUTH_STRATEGY` - `bearer` or `session` (default: session)
//! - `ORDERDESK_CLIENT_URL` - Browser client origin allowed by CORS
//! - `ORDERDESK_LOG_JSON` - Emit JSON logs when set (any value)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_AUTH_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back office API
    pub base_url: String,
    /// Browser client origin allowed to call the API with credentials
    pub client_origin: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
}

/// Which authentication artifact a deployment issues and accepts.
///
/// The two strategies are mutually exclusive per deployment: a bearer
/// deployment never sets session cookies, a session deployment never
/// returns token material in the login body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Stateless signed bearer tokens (`Authorization: Bearer ...`).
    Bearer,
    /// Server-side session records referenced by an opaque cookie.
    Session,
}

impl std::str::FromStr for AuthStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "session" => Ok(Self::Session),
            other => Err(format!("expected 'bearer' or 'session', got '{other}'")),
        }
    }
}

/// Authentication configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// Artifact strategy for this deployment.
    pub strategy: AuthStrategy,
    /// Secret used to sign bearer tokens.
    pub secret: SecretString,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("strategy", &self.strategy)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ORDERDESK_DATABASE_URL")?;
        let host = get_env_or_default("ORDERDESK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERDESK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ORDERDESK_PORT", "4001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERDESK_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ORDERDESK_BASE_URL")?;
        let client_origin = get_optional_env("ORDERDESK_CLIENT_URL");
        let auth = AuthConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            client_origin,
            auth,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the deployment is served over HTTPS (controls cookie `Secure`).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("ORDERDESK_AUTH_SECRET")?;
        validate_secret_length(&secret, "ORDERDESK_AUTH_SECRET")?;

        let strategy = get_env_or_default("ORDERDESK_AUTH_STRATEGY", "session")
            .parse::<AuthStrategy>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERDESK_AUTH_STRATEGY".to_string(), e))?;

        Ok(Self { strategy, secret })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_AUTH_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_AUTH_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
