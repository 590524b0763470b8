//! Server actions: checkout operations invoked on behalf of a request.
//!
//! Actions never read ambient state directly. Everything request-scoped (the
//! session's checkout id, the customer's access token, the routed locale) is
//! reached through an [`ActionContext`], and the commerce API through the
//! service traits, so each action can be exercised with plain test doubles.

pub mod checkout;
pub mod promo_code;

use async_trait::async_trait;
use secrecy::SecretString;

use tillpoint_core::{CheckoutId, Locale};

/// Request-scoped state an action may consult.
#[async_trait]
pub trait ActionContext: Send + Sync {
    /// Checkout bound to the current visitor, if any.
    async fn checkout_id(&self) -> Option<CheckoutId>;

    /// Access token of the signed-in customer, if any.
    async fn access_token(&self) -> Option<SecretString>;

    /// Locale the request was routed under.
    async fn locale(&self) -> Locale;

    /// Forget the visitor's checkout.
    async fn clear_checkout_id(&self);
}
