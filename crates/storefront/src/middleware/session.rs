//! Session middleware configuration.
//!
//! Sessions live in memory and only hold the visitor's checkout id and the
//! signed-in customer's access token.

use secrecy::{ExposeSecret, SecretString};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use tillpoint_core::CheckoutId;

use crate::config::StorefrontConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tp_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Bind a checkout to the visitor.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_checkout_id(
    session: &Session,
    checkout_id: &CheckoutId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CHECKOUT_ID, checkout_id).await
}

/// Forget the visitor's checkout.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_checkout_id(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CheckoutId>(session_keys::CHECKOUT_ID)
        .await?;
    Ok(())
}

/// Store the signed-in customer's access token.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_customer_access_token(
    session: &Session,
    token: &SecretString,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CUSTOMER_ACCESS_TOKEN, token.expose_secret())
        .await
}
