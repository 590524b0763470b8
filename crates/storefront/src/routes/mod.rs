//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                               - Health check
//!
//! # Checkout
//! GET    /{locale}/checkout                    - Current checkout and promo code panel
//! POST   /{locale}/checkout/promo-code         - Apply a promo code
//! DELETE /{locale}/checkout/promo-code         - Remove an applied promo code
//! POST   /{locale}/checkout/billing-address    - Set the billing address
//! POST   /{locale}/checkout/order              - Place the order (303 to confirmation)
//!
//! # Order
//! GET    /{locale}/order/confirmation/{id}     - Confirmation; clears the checkout once
//! ```
//!
//! Bodies are JSON. Success responses carry `"ok": true`; failures use the
//! [`ErrorBody`](crate::error::ErrorBody) envelope.

pub mod checkout;
pub mod order;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    routing::{get, post},
};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::rate_limit::{
    RateLimitConfigError, checkout_rate_limiter, promo_code_rate_limiter,
};
use crate::state::AppState;

/// Success body: `"ok": true` next to the handler's payload.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Success<T> {
    pub const fn new(data: T) -> Json<Self> {
        Json(Self { ok: true, data })
    }
}

/// Turn a malformed JSON body into the shared error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Create the checkout routes router.
///
/// # Errors
///
/// Returns an error if a rate limiter cannot be built.
pub fn checkout_routes() -> Result<Router<AppState>, RateLimitConfigError> {
    let promo_code = Router::new()
        .route(
            "/promo-code",
            post(checkout::add_promo_code).delete(checkout::remove_promo_code),
        )
        .layer(promo_code_rate_limiter()?);

    let actions = Router::new()
        .route("/billing-address", post(checkout::update_billing_address))
        .route("/order", post(checkout::create_order))
        .layer(checkout_rate_limiter()?);

    Ok(Router::new()
        .route("/", get(checkout::show))
        .merge(promo_code)
        .merge(actions))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/confirmation/{id}", get(order::confirmation))
}

/// Create all routes for the storefront.
///
/// # Errors
///
/// Returns an error if a rate limiter cannot be built.
pub fn routes() -> Result<Router<AppState>, RateLimitConfigError> {
    Ok(Router::new()
        .route("/health", get(health))
        .nest("/{locale}/checkout", checkout_routes()?)
        .nest("/{locale}/order", order_routes()))
}

/// Liveness health check. Does not call the commerce API.
async fn health() -> &'static str {
    "ok"
}
