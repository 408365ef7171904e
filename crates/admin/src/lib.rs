//! Order Desk Admin library.
//!
//! This crate provides the back office API as a library, allowing it to be
//! spun up in-process by the integration test suite as well as by the
//! `orderdesk-admin` binary.
//!
//! # Security
//!
//! The `/auth/create` bootstrap endpoint is unprotected. Only deploy this
//! service behind a trusted network boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use config::AdminConfig;
use state::AppState;

/// Build the complete application: routes, tracing and CORS layers.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    let mut app = routes::router().with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    status = tracing::field::Empty,
                    latency_ms = tracing::field::Empty,
                )
            })
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record("latency_ms", latency.as_millis() as u64);
                    DefaultOnResponse::default().on_response(response, latency, span);
                },
            ),
    );

    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    app
}

/// CORS layer for the browser client, when an origin is configured.
fn cors_layer(config: &AdminConfig) -> Option<CorsLayer> {
    let origin = config.client_origin.as_deref()?;

    match origin.parse::<HeaderValue>() {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "invalid ORDERDESK_CLIENT_URL; CORS disabled");
            None
        }
    }
}
