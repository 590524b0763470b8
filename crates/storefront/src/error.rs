//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`.
//!
//! Every error renders as the same JSON envelope the actions use:
//!
//! ```json
//! { "ok": false, "errors": [{ "code": "CHECKOUT_NOT_FOUND_ERROR" }] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use tillpoint_core::{AppErr, ErrorCode};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// An action returned structured errors.
    #[error("Action failed: {}", join(.0))]
    Action(Vec<AppErr>),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Vec<AppErr>> for AppError {
    fn from(errors: Vec<AppErr>) -> Self {
        Self::Action(errors)
    }
}

fn join(errors: &[AppErr]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub errors: Vec<AppErr>,
}

impl AppError {
    /// Whether the failure lies on our side or the commerce API's rather
    /// than in the request.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Action(errors) => errors.iter().any(|e| e.code.is_transport()),
            Self::Session(_) | Self::Internal(_) => true,
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Action(errors) => action_status(errors),
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Errors exposed to the client. Internal details stay in the logs.
    fn client_errors(self) -> Vec<AppErr> {
        match self {
            Self::Action(errors) => errors,
            Self::Session(_) | Self::Internal(_) => {
                vec![AppErr::new(ErrorCode::Unknown).with_message("Internal server error")]
            }
            Self::NotFound(what) => vec![AppErr::new(ErrorCode::NotFound).with_message(what)],
            Self::BadRequest(why) => {
                vec![AppErr::new(ErrorCode::InvalidValue).with_message(why)]
            }
        }
    }
}

/// Status for a failed action: 502 when the commerce API could not be
/// reached or understood, 422 otherwise.
#[must_use]
pub fn action_status(errors: &[AppErr]) -> StatusCode {
    if errors.iter().any(|e| e.code.is_transport()) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = ErrorBody {
            ok: false,
            errors: self.client_errors(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for checkout steps.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("locale fr-FR".to_string());
        assert_eq!(err.to_string(), "Not found: locale fr-FR");

        let err = AppError::Action(vec![
            AppErr::new(ErrorCode::DiscountCodeRemove).with_message("No checkout returned"),
        ]);
        assert_eq!(
            err.to_string(),
            "Action failed: DISCOUNT_CODE_REMOVE_ERROR: No checkout returned"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Action(vec![AppErr::new(ErrorCode::CheckoutNotFound)])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Action(vec![
                AppErr::new(ErrorCode::InvalidValue),
                AppErr::new(ErrorCode::Parse),
            ])),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let errors = AppError::Internal("connection refused".to_string()).client_errors();
        assert_eq!(errors[0].code, ErrorCode::Unknown);
        assert_eq!(errors[0].message.as_deref(), Some("Internal server error"));
    }
}
