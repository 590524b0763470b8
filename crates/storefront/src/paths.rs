//! Localized storefront paths.

use tillpoint_core::{Locale, OrderId};

/// Query parameter marking a confirmation page reached straight after checkout.
pub const ORDER_PLACED_PARAM: &str = "orderPlaced";

/// `/{locale}/order/confirmation/{id}`, optionally with the order-placed marker.
#[must_use]
pub fn order_confirmation(locale: Locale, order_id: &OrderId, order_placed: bool) -> String {
    let path = format!(
        "/{locale}/order/confirmation/{}",
        urlencoding::encode(order_id.as_str())
    );
    if order_placed {
        format!("{path}?{ORDER_PLACED_PARAM}=true")
    } else {
        path
    }
}
