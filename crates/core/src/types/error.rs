//! Structured error codes returned across every checkout boundary.
//!
//! Expected failures never panic or bubble up as opaque errors: adapters and
//! actions return a non-empty list of [`AppErr`] values whose [`ErrorCode`]
//! comes from a closed set the UI knows how to translate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of domain error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Operation-specific failures
    #[serde(rename = "CHECKOUT_NOT_FOUND_ERROR")]
    CheckoutNotFound,
    #[serde(rename = "CHECKOUT_COMPLETE_ERROR")]
    CheckoutComplete,
    #[serde(rename = "CHECKOUT_ADDRESS_UPDATE_ERROR")]
    CheckoutAddressUpdate,
    #[serde(rename = "CHECKOUT_ADDRESS_MISSING_ERROR")]
    CheckoutAddressMissing,
    #[serde(rename = "DISCOUNT_CODE_ADD_ERROR")]
    DiscountCodeAdd,
    #[serde(rename = "DISCOUNT_CODE_REMOVE_ERROR")]
    DiscountCodeRemove,
    #[serde(rename = "ACCOUNT_ADDRESS_CREATE_ERROR")]
    AccountAddressCreate,

    // Business errors reported by the commerce API
    #[serde(rename = "INVALID_VALUE_ERROR")]
    InvalidValue,
    #[serde(rename = "VOUCHER_NOT_APPLICABLE_ERROR")]
    VoucherNotApplicable,
    #[serde(rename = "GIFT_CARD_NOT_APPLICABLE_ERROR")]
    GiftCardNotApplicable,
    #[serde(rename = "NOT_FOUND_ERROR")]
    NotFound,
    #[serde(rename = "REQUIRED_ERROR")]
    Required,
    #[serde(rename = "INSUFFICIENT_STOCK_ERROR")]
    InsufficientStock,
    #[serde(rename = "UNIQUE_ERROR")]
    Unique,

    // Transport failures
    #[serde(rename = "HTTP_ERROR")]
    Http,
    #[serde(rename = "GRAPHQL_ERROR")]
    GraphQl,
    #[serde(rename = "PARSE_ERROR")]
    Parse,

    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorCode {
    /// The wire representation of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckoutNotFound => "CHECKOUT_NOT_FOUND_ERROR",
            Self::CheckoutComplete => "CHECKOUT_COMPLETE_ERROR",
            Self::CheckoutAddressUpdate => "CHECKOUT_ADDRESS_UPDATE_ERROR",
            Self::CheckoutAddressMissing => "CHECKOUT_ADDRESS_MISSING_ERROR",
            Self::DiscountCodeAdd => "DISCOUNT_CODE_ADD_ERROR",
            Self::DiscountCodeRemove => "DISCOUNT_CODE_REMOVE_ERROR",
            Self::AccountAddressCreate => "ACCOUNT_ADDRESS_CREATE_ERROR",
            Self::InvalidValue => "INVALID_VALUE_ERROR",
            Self::VoucherNotApplicable => "VOUCHER_NOT_APPLICABLE_ERROR",
            Self::GiftCardNotApplicable => "GIFT_CARD_NOT_APPLICABLE_ERROR",
            Self::NotFound => "NOT_FOUND_ERROR",
            Self::Required => "REQUIRED_ERROR",
            Self::InsufficientStock => "INSUFFICIENT_STOCK_ERROR",
            Self::Unique => "UNIQUE_ERROR",
            Self::Http => "HTTP_ERROR",
            Self::GraphQl => "GRAPHQL_ERROR",
            Self::Parse => "PARSE_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Whether this code describes a failure talking to the commerce API
    /// rather than a rejected request.
    #[must_use]
    pub const fn is_transport(self) -> bool {
        matches!(self, Self::Http | Self::GraphQl | Self::Parse)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppErr {
    pub code: ErrorCode,
    /// Input field the error refers to, when the API reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AppErr {
    /// Create an error carrying only a code.
    #[must_use]
    pub const fn new(code: ErrorCode) -> Self {
        Self {
            code,
            field: None,
            message: None,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the offending input field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for AppErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Uniform result of every adapter and action.
pub type AppResult<T> = Result<T, Vec<AppErr>>;
