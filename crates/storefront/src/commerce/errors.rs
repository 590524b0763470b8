//! Translation of mutation payload errors into domain error codes.

use tillpoint_core::{AppErr, ErrorCode};

use super::fragments::MutationErrorFragment;

/// Map an API error code onto the domain's closed set.
#[must_use]
pub fn map_error_code(code: &str) -> ErrorCode {
    match code {
        "INVALID" => ErrorCode::InvalidValue,
        "VOUCHER_NOT_APPLICABLE" => ErrorCode::VoucherNotApplicable,
        "GIFT_CARD_NOT_APPLICABLE" => ErrorCode::GiftCardNotApplicable,
        "NOT_FOUND" => ErrorCode::NotFound,
        "REQUIRED" => ErrorCode::Required,
        "INSUFFICIENT_STOCK" => ErrorCode::InsufficientStock,
        "UNIQUE" => ErrorCode::Unique,
        _ => ErrorCode::Unknown,
    }
}

/// Translate every payload error, carrying field and message through.
#[must_use]
pub fn handle_mutation_errors(errors: Vec<MutationErrorFragment>) -> Vec<AppErr> {
    errors
        .into_iter()
        .map(|error| AppErr {
            code: map_error_code(&error.code),
            field: error.field,
            message: error.message,
        })
        .collect()
}
