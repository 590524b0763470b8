//! Promo code actions.

use tracing::{debug, instrument};

use tillpoint_core::{AppResult, CheckoutId, PromoCodeRef, PromoCodeResult};

use crate::services::CheckoutService;

/// Apply a voucher or gift card code to the checkout.
#[instrument(skip(checkouts), fields(checkout_id = %checkout_id))]
pub async fn add_promo_code(
    checkouts: &dyn CheckoutService,
    checkout_id: &CheckoutId,
    promo_code: &str,
) -> AppResult<PromoCodeResult> {
    let result = checkouts.add_promo_code(checkout_id, promo_code).await?;
    debug!(
        gift_cards = result.used_gift_cards.len(),
        "Promo code applied"
    );
    Ok(result)
}

/// Remove a voucher (by code) or gift card (by ID) from the checkout.
#[instrument(skip(checkouts), fields(checkout_id = %checkout_id))]
pub async fn remove_promo_code(
    checkouts: &dyn CheckoutService,
    checkout_id: &CheckoutId,
    promo_code: &PromoCodeRef,
) -> AppResult<PromoCodeResult> {
    let result = checkouts.remove_promo_code(checkout_id, promo_code).await?;
    debug!(
        gift_cards = result.used_gift_cards.len(),
        "Promo code removed"
    );
    Ok(result)
}
