//! Commerce GraphQL API client.
//!
//! # Architecture
//!
//! - Uses `graphql_client` for the query/response envelopes, `reqwest` 0.13 for HTTP
//! - The commerce API is the source of truth: nothing is cached or synced locally
//! - Adapters in [`checkout`] and [`user`] translate responses into
//!   `tillpoint_core` types and failures into structured [`AppErr`] lists
//!
//! Every adapter is split in two: an async method that executes the operation
//! and a pure function interpreting the outcome, so the interpretation can be
//! tested against JSON fixtures.

pub mod checkout;
pub mod errors;
mod fragments;
pub mod queries;
pub mod serializers;
pub mod user;

pub use checkout::CommerceCheckoutService;
pub use user::CommerceUserService;

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use tillpoint_core::{AppErr, ErrorCode};

use crate::config::CommerceApiConfig;

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// GraphQL query returned top-level errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CommerceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl CommerceError {
    /// The structured error code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Http(_) => ErrorCode::Http,
            Self::GraphQL(_) => ErrorCode::GraphQl,
            Self::Parse(_) => ErrorCode::Parse,
        }
    }
}

impl From<CommerceError> for Vec<AppErr> {
    fn from(err: CommerceError) -> Self {
        match err {
            CommerceError::GraphQL(errors) if !errors.is_empty() => errors
                .into_iter()
                .map(|e| AppErr::new(ErrorCode::GraphQl).with_message(e.message))
                .collect(),
            other => vec![AppErr::new(other.code()).with_message(other.to_string())],
        }
    }
}

/// A GraphQL error returned by the commerce API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl GraphQLError {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn truncated(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce GraphQL API.
///
/// Cheap to clone; the HTTP connection pool is shared.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    endpoint: Url,
    app_token: Option<SecretString>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &CommerceApiConfig) -> Self {
        Self {
            inner: Arc::new(CommerceClientInner {
                client: reqwest::Client::new(),
                endpoint: config.api_url.clone(),
                app_token: config.app_token.clone(),
            }),
        }
    }

    /// Execute an operation with the app token, if one is configured.
    pub(crate) async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, CommerceError>
    where
        Q::Variables: serde::Serialize,
    {
        let token = self.inner.app_token.as_ref().map(ExposeSecret::expose_secret);
        self.send::<Q>(variables, token).await
    }

    /// Execute an operation on behalf of a signed-in customer.
    pub(crate) async fn execute_as<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
        access_token: &SecretString,
    ) -> Result<Q::ResponseData, CommerceError>
    where
        Q::Variables: serde::Serialize,
    {
        self.send::<Q>(variables, Some(access_token.expose_secret()))
            .await
    }

    #[instrument(skip(self, variables, bearer), fields(endpoint = %self.inner.endpoint))]
    async fn send<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
        bearer: Option<&str>,
    ) -> Result<Q::ResponseData, CommerceError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);

        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&request_body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %truncated(&response_text, 500),
                "Commerce API returned non-success status"
            );
            return Err(CommerceError::Http(format!(
                "HTTP {status}: {}",
                truncated(&response_text, 200)
            )));
        }

        parse_response::<Q::ResponseData>(&response_text)
    }
}

/// Parse a GraphQL response body into its data, surfacing top-level errors.
pub(crate) fn parse_response<T: serde::de::DeserializeOwned>(
    body: &str,
) -> Result<T, CommerceError> {
    let response: Response<T> = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %truncated(body, 500),
                "Failed to parse commerce GraphQL response"
            );
            return Err(CommerceError::Parse(e));
        }
    };

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        tracing::debug!(errors = ?errors, "GraphQL errors in response");

        return Err(CommerceError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e.locations.map_or_else(Vec::new, |locs| {
                        locs.into_iter()
                            .map(|l| GraphQLErrorLocation {
                                line: i64::from(l.line),
                                column: i64::from(l.column),
                            })
                            .collect()
                    }),
                    path: e.path.map_or_else(Vec::new, |p| {
                        p.into_iter()
                            .map(|fragment| match fragment {
                                graphql_client::PathFragment::Key(s) => {
                                    serde_json::Value::String(s)
                                }
                                graphql_client::PathFragment::Index(i) => {
                                    serde_json::Value::Number(i.into())
                                }
                            })
                            .collect()
                    }),
                })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        tracing::error!(
            body = %truncated(body, 500),
            "Commerce GraphQL response has no data and no errors"
        );
        CommerceError::GraphQL(vec![GraphQLError::message("No data in response")])
    })
}
