//! Integration test support for Order Desk.
//!
//! Each test spawns its own in-process server ([`TestServer::spawn`]) on an
//! ephemeral port over an in-memory database, so tests are hermetic and
//! independent. Scenarios drive the real HTTP surface with
//! `orderdesk-client` (the client session manager) or raw `reqwest` when a
//! test needs to forge or withhold artifacts.

use chrono::{Duration, Utc};
use secrecy::SecretString;
use sqlx::SqlitePool;

use orderdesk_admin::config::{AdminConfig, AuthConfig, AuthStrategy};
use orderdesk_admin::db::{self, OrderRepository};
use orderdesk_admin::models::Order;
use orderdesk_admin::state::AppState;
use orderdesk_client::{AuthClient, ClientMode, MemoryArtifactStore};
use orderdesk_core::{Email, OrderNumber, OrderStatus};

/// Signing secret used by every test deployment.
pub const TEST_SECRET: &str = "J2vR8qLw5xTz1nYfKb3MhUc7EdGp0AsW";

/// An in-process back office instance bound to an ephemeral port.
pub struct TestServer {
    /// Base URL of the running server, e.g. `http://127.0.0.1:54321`.
    pub base_url: String,
    /// Handle to the server's database (for seeding and assertions).
    pub pool: SqlitePool,
    server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server configured for the given auth strategy.
    ///
    /// # Panics
    ///
    /// Panics if the pool, migrations or listener cannot be set up.
    pub async fn spawn(strategy: AuthStrategy) -> Self {
        let database_url = SecretString::from("sqlite::memory:");
        let pool = db::create_pool(&database_url)
            .await
            .expect("create in-memory pool");
        db::MIGRATOR.run(&pool).await.expect("run migrations");

        let config = AdminConfig {
            database_url,
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            client_origin: None,
            auth: AuthConfig {
                strategy,
                secret: SecretString::from(TEST_SECRET),
            },
        };

        let state = AppState::new(config, pool.clone());
        let app = orderdesk_admin::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            pool,
            server,
        }
    }

    /// A client session manager pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self, mode: ClientMode) -> AuthClient {
        AuthClient::new(
            self.base_url.clone(),
            mode,
            Box::new(MemoryArtifactStore::default()),
        )
        .expect("build client")
    }

    /// A raw HTTP client with its own cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn raw_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("build raw client")
    }

    /// Create an admin account through the bootstrap endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the account is not created.
    pub async fn create_admin(&self, email: &str, password: &str) {
        let response = self
            .raw_client()
            .post(format!("{}/auth/create", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("create admin request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    /// Seed an order directly into the store, `hours_ago` hours in the past.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails.
    pub async fn seed_order(&self, number: &str, hours_ago: i64) -> Order {
        OrderRepository::new(&self.pool)
            .create(
                &OrderNumber::parse(number).expect("valid order number"),
                &Email::parse("customer@example.net").expect("valid email"),
                OrderStatus::Pending,
                4200,
                Utc::now() - Duration::hours(hours_ago),
            )
            .await
            .expect("seed order")
    }

    /// Fetch an order's current status straight from the store.
    ///
    /// # Panics
    ///
    /// Panics if the order is missing.
    pub async fn order_status(&self, number: &str) -> OrderStatus {
        OrderRepository::new(&self.pool)
            .get_by_number(&OrderNumber::parse(number).expect("valid order number"))
            .await
            .expect("query order")
            .expect("order exists")
            .status
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}
