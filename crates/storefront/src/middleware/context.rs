//! Request context extractor for checkout actions.
//!
//! `SessionContext` pairs the visitor's session with the locale the request
//! was routed under and exposes both to the actions as an [`ActionContext`].

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use secrecy::SecretString;
use tower_sessions::Session;
use tracing::warn;

use tillpoint_core::{CheckoutId, Locale};

use super::session::clear_checkout_id;
use crate::actions::ActionContext;
use crate::error::AppError;
use crate::models::session_keys;

/// Session plus routed locale for a `/{locale}/...` request.
///
/// Rejects unsupported locales with 404. Reading the session never fails the
/// action: a store error is logged and treated as an empty session.
#[derive(Clone)]
pub struct SessionContext {
    pub session: Session,
    pub locale: Locale,
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("locale".to_string()))?;

        let tag = params.get("locale").map_or("", String::as_str);
        let locale = tag
            .parse::<Locale>()
            .map_err(|e| AppError::NotFound(e.to_string()))?;

        Ok(Self { session, locale })
    }
}

#[async_trait]
impl ActionContext for SessionContext {
    async fn checkout_id(&self) -> Option<CheckoutId> {
        self.session
            .get::<CheckoutId>(session_keys::CHECKOUT_ID)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read checkout id from session");
                None
            })
    }

    async fn access_token(&self) -> Option<SecretString> {
        self.session
            .get::<String>(session_keys::CUSTOMER_ACCESS_TOKEN)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read access token from session");
                None
            })
            .map(SecretString::from)
    }

    async fn locale(&self) -> Locale {
        self.locale
    }

    async fn clear_checkout_id(&self) {
        if let Err(e) = clear_checkout_id(&self.session).await {
            warn!(error = %e, "Failed to clear checkout id from session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use secrecy::ExposeSecret;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;
    use crate::middleware::session::{set_checkout_id, set_customer_access_token};

    fn context() -> SessionContext {
        SessionContext {
            session: Session::new(None, Arc::new(MemoryStore::default()), None),
            locale: Locale::EnGb,
        }
    }

    #[tokio::test]
    async fn test_empty_session() {
        let ctx = context();
        assert_eq!(ctx.checkout_id().await, None);
        assert!(ctx.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_reads_session_values() {
        let ctx = context();
        set_checkout_id(&ctx.session, &CheckoutId::new("Q2hlY2tvdXQ6MQ=="))
            .await
            .unwrap();
        set_customer_access_token(&ctx.session, &SecretString::from("customer-token"))
            .await
            .unwrap();

        assert_eq!(
            ctx.checkout_id().await,
            Some(CheckoutId::new("Q2hlY2tvdXQ6MQ=="))
        );
        assert_eq!(
            ctx.access_token().await.unwrap().expose_secret(),
            "customer-token"
        );

        ctx.clear_checkout_id().await;
        assert_eq!(ctx.checkout_id().await, None);
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/{locale}/probe",
                get(|ctx: SessionContext| async move { ctx.locale.to_string() }),
            )
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_extracts_supported_locale() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/en-GB/probe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"en-GB");
    }

    #[tokio::test]
    async fn test_unsupported_locale_is_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/fr-FR/probe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
