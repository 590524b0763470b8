//! Tillpoint Storefront library.
//!
//! Checkout backend for the storefront: promo codes, billing address, order
//! placement and the confirmation hand-off, all served over the commerce
//! GraphQL API. Exposed as a library so the router can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod commerce;
pub mod components;
pub mod config;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod paths;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;

use std::time::Duration;

use axum::{Router, extract::Request, middleware as axum_middleware, response::Response};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::rate_limit::RateLimitConfigError;
use crate::state::AppState;

/// Build the storefront router with its request-scoped middleware.
///
/// Sentry layers are left to the binary so tests run without a client.
///
/// # Errors
///
/// Returns an error if a rate limiter cannot be built.
pub fn app(state: AppState) -> Result<Router, RateLimitConfigError> {
    Ok(with_middleware(routes::routes()?, state))
}

/// Wrap `router` in the session, request ID and tracing layers.
pub fn with_middleware(router: Router<AppState>, state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    router
        .layer(session_layer)
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
