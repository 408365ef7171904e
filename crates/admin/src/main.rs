//! Order Desk Admin - back office API server binary.
//!
//! # Architecture
//!
//! - Axum web framework, JSON API only
//! - `SQLite` for admin accounts, sessions and orders
//! - Pluggable auth strategy (bearer tokens or cookie sessions) via
//!   `ORDERDESK_AUTH_STRATEGY`

#![cfg_attr(not(test), forbid(unsafe_code))]

use orderdesk_admin::{app, config::AdminConfig, db, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (fails hard on bad config)
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orderdesk_admin=info,tower_http=debug".into());

    // JSON format for log shippers, text format for humans
    let json_logs = std::env::var("ORDERDESK_LOG_JSON").is_ok();
    let json_layer = json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    // Initialize database connection pool and bring the schema up to date
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Build application state and router
    let state = AppState::new(config.clone(), pool);
    let app = app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!(
        strategy = ?config.auth.strategy,
        "back office listening on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
