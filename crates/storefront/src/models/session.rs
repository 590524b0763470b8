//! Session-related types.
//!
//! Values stored in the session for the visitor's checkout and sign-in state.

/// Session keys for checkout data.
pub mod keys {
    /// Key for the checkout bound to the visitor.
    pub const CHECKOUT_ID: &str = "checkout_id";

    /// Key for the signed-in customer's commerce API access token.
    pub const CUSTOMER_ACCESS_TOKEN: &str = "customer_access_token";
}
