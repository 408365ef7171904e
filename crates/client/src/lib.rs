//! Order Desk Client - the browser-side session manager, in Rust.
//!
//! [`AuthClient`] plays the part the single-page front end plays in a
//! deployment: it stores the auth artifact, attaches it to outgoing
//! requests, resolves authentication state on startup, and falls back to
//! an unauthenticated view when the server rejects it. The integration
//! suite drives the back office through it.
//!
//! State rules:
//! - `loading` is only true during the initial resolve-on-load and while a
//!   login is being confirmed; it is distinct from "not authenticated".
//! - The client does not consider itself authenticated after login until
//!   the artifact is durably stored *and* a follow-up check resolves.
//! - Logout clears local state unconditionally, even when the server call
//!   fails.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod store;

pub use error::ClientError;
pub use store::{ArtifactStore, MemoryArtifactStore, StoreError};

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use orderdesk_core::{AdminId, Email, OrderId, OrderNumber, OrderStatus};

/// The authenticated identity as reported by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    /// Admin ID.
    pub id: AdminId,
    /// Admin email.
    pub email: Email,
}

/// Which artifact transport the deployment uses.
///
/// Must match the server's configured strategy: bearer clients persist the
/// token themselves, session clients lean on the cookie jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// Token in the `Authorization` header, persisted via [`ArtifactStore`].
    Bearer,
    /// Ambient session cookie, managed by the HTTP client's cookie store.
    Session,
}

/// Client-side authentication state.
#[derive(Debug, Default)]
pub struct ClientAuthState {
    principal: Option<Principal>,
    artifact: Option<String>,
    loading: bool,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    admin: Principal,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    admin: Principal,
}

/// An order as the client sees it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Internal record ID.
    pub id: OrderId,
    /// Human-facing order number.
    pub order_number: OrderNumber,
    /// Customer contact email.
    pub customer_email: Email,
    /// Current status.
    pub status: OrderStatus,
    /// Total in cents.
    pub total_cents: i64,
}

#[derive(Debug, Deserialize)]
struct ListOrdersResponse {
    data: Vec<OrderSummary>,
}

#[derive(Debug, Deserialize)]
struct UpdateOrderResponse {
    data: OrderSummary,
}

/// Session-managing API client for the back office.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    mode: ClientMode,
    store: Box<dyn ArtifactStore>,
    state: ClientAuthState,
}

impl AuthClient {
    /// Create a client against `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        mode: ClientMode,
        store: Box<dyn ArtifactStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            mode,
            store,
            state: ClientAuthState::default(),
        })
    }

    /// The resolved principal, if authenticated.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.state.principal.as_ref()
    }

    /// Whether the client currently holds an authenticated principal.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.principal.is_some()
    }

    /// Whether an authentication resolve is in flight.
    ///
    /// Callers must render a neutral view while this is true - it is not
    /// the same as "not authenticated".
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// The locally held artifact, if any (bearer mode only).
    #[must_use]
    pub fn artifact(&self) -> Option<&str> {
        self.state.artifact.as_deref()
    }

    /// Resolve authentication state on application load.
    ///
    /// Bearer mode with no stored artifact settles to unauthenticated
    /// without a network call. Otherwise the stored artifact (or the
    /// ambient session cookie) is checked against the server.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Store` if the artifact store cannot be read.
    /// A failed or rejected check settles to unauthenticated, not an error.
    pub async fn bootstrap(&mut self) -> Result<(), ClientError> {
        let stored = self.store.load()?;

        if stored.is_none() && self.mode == ClientMode::Bearer {
            self.state = ClientAuthState::default();
            return Ok(());
        }

        self.state.loading = true;
        self.state.artifact = stored;

        match self.check().await {
            Ok(principal) => self.state.principal = principal,
            Err(err) => {
                tracing::debug!(error = %err, "bootstrap check failed");
                self.state.principal = None;
            }
        }

        self.state.loading = false;
        Ok(())
    }

    /// Log in with credentials.
    ///
    /// Returns `Ok(true)` only once the issued artifact is durably stored
    /// and a follow-up check has resolved it; `Ok(false)` means the server
    /// rejected the credentials.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` on transport failure or
    /// `ClientError::Store` if the artifact cannot be persisted.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<bool, ClientError> {
        self.state.loading = true;

        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.state.loading = false;
                return Err(err.into());
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "login rejected");
            self.state.loading = false;
            return Ok(false);
        }

        let result = self.finish_login(response).await;
        self.state.loading = false;
        result
    }

    async fn finish_login(&mut self, response: reqwest::Response) -> Result<bool, ClientError> {
        let body: LoginResponse = response.json().await?;
        tracing::debug!(email = %body.admin.email, "login accepted; confirming artifact");

        // Persist the artifact before trusting the login response; the
        // session cookie (if any) is already in the jar.
        if let Some(token) = body.token {
            self.store.save(&token)?;
            self.state.artifact = Some(token);
        }

        // Authenticated only once the stored artifact actually resolves.
        self.state.principal = self.check().await?;
        Ok(self.state.principal.is_some())
    }

    /// Log out.
    ///
    /// The server call is best-effort; local principal, artifact and store
    /// are cleared no matter what.
    pub async fn logout(&mut self) {
        let request = self.authorize(self.http.post(format!("{}/auth/logout", self.base_url)));
        if let Err(err) = request.send().await {
            tracing::debug!(error = %err, "logout request failed; clearing local state anyway");
        }

        self.state.principal = None;
        self.state.artifact = None;
        if let Err(err) = self.store.clear() {
            tracing::debug!(error = %err, "artifact store clear failed");
        }
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the server rejects the
    /// artifact (the client drops to unauthenticated), `ClientError::Http`
    /// on transport failure.
    pub async fn list_orders(&mut self) -> Result<Vec<OrderSummary>, ClientError> {
        let request = self.authorize(
            self.http
                .get(format!("{}/api/admin/orders", self.base_url)),
        );
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => {
                let body: ListOrdersResponse = response.json().await?;
                Ok(body.data)
            }
            StatusCode::UNAUTHORIZED => {
                self.on_rejected();
                Err(ClientError::Unauthorized)
            }
            other => Err(ClientError::UnexpectedStatus(other)),
        }
    }

    /// Update an order's status by business key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the server rejects the
    /// artifact, `ClientError::UnexpectedStatus` for other failures (e.g.
    /// unknown order number).
    pub async fn update_order_status(
        &mut self,
        order_number: &OrderNumber,
        status: OrderStatus,
    ) -> Result<OrderSummary, ClientError> {
        let request = self.authorize(self.http.patch(format!(
            "{}/api/admin/orders/{}/status",
            self.base_url, order_number
        )));
        let response = request
            .json(&json!({ "status": status }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: UpdateOrderResponse = response.json().await?;
                Ok(body.data)
            }
            StatusCode::UNAUTHORIZED => {
                self.on_rejected();
                Err(ClientError::Unauthorized)
            }
            other => Err(ClientError::UnexpectedStatus(other)),
        }
    }

    /// Ask the server who the presented artifact belongs to.
    ///
    /// `Ok(None)` covers every rejection - the caller only learns
    /// authenticated-or-not, matching what the server reveals.
    async fn check(&self) -> Result<Option<Principal>, ClientError> {
        let request = self.authorize(
            self.http
                .get(format!("{}/api/admin/check", self.base_url)),
        );
        let response = request.send().await?;

        if response.status() == StatusCode::OK {
            let body: CheckResponse = response.json().await?;
            Ok(Some(body.admin))
        } else {
            tracing::debug!(status = %response.status(), "check resolved unauthenticated");
            Ok(None)
        }
    }

    /// The server said 401: return to the unauthenticated view.
    fn on_rejected(&mut self) {
        self.state.principal = None;
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.state.artifact {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_settled_and_unauthenticated() {
        let client = AuthClient::new(
            "http://127.0.0.1:1",
            ClientMode::Bearer,
            Box::new(MemoryArtifactStore::default()),
        )
        .unwrap();

        assert!(!client.is_authenticated());
        assert!(!client.is_loading());
        assert!(client.principal().is_none());
        assert!(client.artifact().is_none());
    }

    #[tokio::test]
    async fn test_bearer_bootstrap_without_artifact_is_offline() {
        // The base URL is unroutable: if bootstrap tried the network this
        // would error instead of settling to unauthenticated.
        let mut client = AuthClient::new(
            "http://127.0.0.1:1",
            ClientMode::Bearer,
            Box::new(MemoryArtifactStore::default()),
        )
        .unwrap();

        client.bootstrap().await.unwrap();
        assert!(!client.is_authenticated());
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_bearer_bootstrap_with_stale_artifact_settles_unauthenticated() {
        let store = MemoryArtifactStore::default();
        store.save("stale-token").unwrap();

        let mut client = AuthClient::new(
            "http://127.0.0.1:1",
            ClientMode::Bearer,
            Box::new(store),
        )
        .unwrap();

        // Network is unreachable; the failed check settles to
        // unauthenticated rather than erroring out of bootstrap.
        client.bootstrap().await.unwrap();
        assert!(!client.is_authenticated());
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_logout_clears_state_even_when_server_unreachable() {
        let store = MemoryArtifactStore::default();
        store.save("some-token").unwrap();

        let mut client = AuthClient::new(
            "http://127.0.0.1:1",
            ClientMode::Bearer,
            Box::new(store),
        )
        .unwrap();
        client.state.artifact = Some("some-token".to_owned());

        client.logout().await;
        assert!(!client.is_authenticated());
        assert!(client.artifact().is_none());
        assert_eq!(client.store.load().unwrap(), None);
    }
}
