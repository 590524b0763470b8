//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Rate limiting (governor, checkout actions only)
//!
//! Handlers reach the session and routed locale through [`SessionContext`].

pub mod context;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use context::SessionContext;
pub use rate_limit::{checkout_rate_limiter, promo_code_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::{
    clear_checkout_id, create_session_layer, set_checkout_id, set_customer_access_token,
};
