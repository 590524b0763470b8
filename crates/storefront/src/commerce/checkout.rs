//! Checkout adapters over the commerce API.

use async_trait::async_trait;
use tracing::{error, instrument};

use tillpoint_core::{
    Address, AddressType, AppErr, AppResult, Checkout, CheckoutId, ErrorCode, OrderCreated,
    OrderId, PriceType, PromoCodeRef, PromoCodeResult,
};

use super::errors::handle_mutation_errors;
use super::queries::{
    AddressInput, CheckoutAddPromoCodeMutation, CheckoutAddressPayload,
    CheckoutBillingAddressUpdateMutation, CheckoutCompleteMutation, CheckoutQuery,
    CheckoutRemovePromoCodeMutation, CheckoutShippingAddressUpdateMutation,
    checkout_add_promo_code, checkout_billing_address_update, checkout_complete, checkout_query,
    checkout_remove_promo_code, checkout_shipping_address_update,
};
use super::serializers::{serialize_checkout, serialize_gift_card};
use super::{CommerceClient, CommerceError};
use crate::services::CheckoutService;

/// [`CheckoutService`] backed by the commerce GraphQL API.
#[derive(Clone)]
pub struct CommerceCheckoutService {
    client: CommerceClient,
}

impl CommerceCheckoutService {
    #[must_use]
    pub const fn new(client: CommerceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CheckoutService for CommerceCheckoutService {
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    async fn checkout_get(
        &self,
        checkout_id: &CheckoutId,
        price_type: PriceType,
    ) -> AppResult<Checkout> {
        let result = self
            .client
            .execute::<CheckoutQuery>(checkout_query::Variables {
                id: checkout_id.to_string(),
            })
            .await;

        checkout_get_result(checkout_id, price_type, result)
    }

    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    async fn add_promo_code(
        &self,
        checkout_id: &CheckoutId,
        promo_code: &str,
    ) -> AppResult<PromoCodeResult> {
        let result = self
            .client
            .execute::<CheckoutAddPromoCodeMutation>(checkout_add_promo_code::Variables {
                checkout_id: checkout_id.to_string(),
                promo_code: promo_code.to_string(),
            })
            .await;

        add_promo_code_result(checkout_id, promo_code, result)
    }

    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    async fn remove_promo_code(
        &self,
        checkout_id: &CheckoutId,
        promo_code: &PromoCodeRef,
    ) -> AppResult<PromoCodeResult> {
        let (promo_code, promo_code_id) = match promo_code {
            PromoCodeRef::Id(id) => (None, Some(id.clone())),
            PromoCodeRef::Code(code) => (Some(code.clone()), None),
        };

        let result = self
            .client
            .execute::<CheckoutRemovePromoCodeMutation>(checkout_remove_promo_code::Variables {
                checkout_id: checkout_id.to_string(),
                promo_code,
                promo_code_id,
            })
            .await;

        remove_promo_code_result(checkout_id, result)
    }

    #[instrument(skip(self, address), fields(checkout_id = %checkout_id))]
    async fn checkout_address_update(
        &self,
        checkout_id: &CheckoutId,
        address: &Address,
        address_type: AddressType,
    ) -> AppResult<()> {
        let address = AddressInput::from(address);

        let result = match address_type {
            AddressType::Billing => self
                .client
                .execute::<CheckoutBillingAddressUpdateMutation>(
                    checkout_billing_address_update::Variables {
                        checkout_id: checkout_id.to_string(),
                        address,
                    },
                )
                .await
                .map(|data| data.checkout_billing_address_update),
            AddressType::Shipping => self
                .client
                .execute::<CheckoutShippingAddressUpdateMutation>(
                    checkout_shipping_address_update::Variables {
                        checkout_id: checkout_id.to_string(),
                        address,
                    },
                )
                .await
                .map(|data| data.checkout_shipping_address_update),
        };

        address_update_result(checkout_id, address_type, result)
    }

    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    async fn order_create(&self, checkout_id: &CheckoutId) -> AppResult<OrderCreated> {
        let result = self
            .client
            .execute::<CheckoutCompleteMutation>(checkout_complete::Variables {
                checkout_id: checkout_id.to_string(),
            })
            .await;

        order_create_result(checkout_id, result)
    }
}

// =============================================================================
// Response interpretation
// =============================================================================

fn checkout_get_result(
    checkout_id: &CheckoutId,
    price_type: PriceType,
    result: Result<checkout_query::ResponseData, CommerceError>,
) -> AppResult<Checkout> {
    let data = result.map_err(|e| {
        error!(checkout_id = %checkout_id, error = %e, "Failed to fetch checkout");
        Vec::<AppErr>::from(e)
    })?;

    let Some(checkout) = data.checkout else {
        error!(checkout_id = %checkout_id, "Checkout not found");
        return Err(vec![AppErr::new(ErrorCode::CheckoutNotFound)]);
    };

    Ok(serialize_checkout(checkout, price_type))
}

/// Payload errors are checked before the nested checkout.
fn add_promo_code_result(
    checkout_id: &CheckoutId,
    promo_code: &str,
    result: Result<checkout_add_promo_code::ResponseData, CommerceError>,
) -> AppResult<PromoCodeResult> {
    let data = result.map_err(|e| {
        error!(checkout_id = %checkout_id, promo_code, error = %e, "Failed to apply promo code");
        Vec::<AppErr>::from(e)
    })?;

    let Some(payload) = data.checkout_add_promo_code else {
        error!(
            checkout_id = %checkout_id,
            promo_code,
            "Add promo code to checkout mutation returned no data"
        );
        return Err(vec![AppErr::new(ErrorCode::DiscountCodeAdd)]);
    };

    if !payload.errors.is_empty() {
        error!(
            checkout_id = %checkout_id,
            promo_code,
            errors = ?payload.errors,
            "Add promo code to checkout mutation returned errors"
        );
        return Err(handle_mutation_errors(payload.errors));
    }

    let Some(checkout) = payload.checkout else {
        error!(
            checkout_id = %checkout_id,
            promo_code,
            "Add promo code to checkout mutation returned no checkout"
        );
        return Err(vec![AppErr::new(ErrorCode::DiscountCodeAdd)]);
    };

    Ok(PromoCodeResult {
        success: true,
        used_gift_cards: checkout
            .gift_cards
            .into_iter()
            .map(serialize_gift_card)
            .collect(),
    })
}

/// The nested checkout is checked before payload errors.
fn remove_promo_code_result(
    checkout_id: &CheckoutId,
    result: Result<checkout_remove_promo_code::ResponseData, CommerceError>,
) -> AppResult<PromoCodeResult> {
    const NO_DATA: &str = "No data returned";
    const NO_CHECKOUT: &str = "No checkout returned";

    let data = result.map_err(|e| {
        error!(checkout_id = %checkout_id, error = %e, "Failed to remove promo code");
        Vec::<AppErr>::from(e)
    })?;

    let Some(payload) = data.checkout_remove_promo_code else {
        error!(checkout_id = %checkout_id, errors = NO_DATA, "Failed to remove promo code");
        return Err(vec![
            AppErr::new(ErrorCode::DiscountCodeRemove).with_message(NO_DATA),
        ]);
    };

    let Some(checkout) = payload.checkout else {
        error!(checkout_id = %checkout_id, errors = NO_CHECKOUT, "Failed to remove promo code");
        return Err(vec![
            AppErr::new(ErrorCode::DiscountCodeRemove).with_message(NO_CHECKOUT),
        ]);
    };

    if !payload.errors.is_empty() {
        error!(
            checkout_id = %checkout_id,
            errors = ?payload.errors,
            "Remove promo code mutation returned errors"
        );
        return Err(handle_mutation_errors(payload.errors));
    }

    Ok(PromoCodeResult {
        success: true,
        used_gift_cards: checkout
            .gift_cards
            .into_iter()
            .map(serialize_gift_card)
            .collect(),
    })
}

fn address_update_result(
    checkout_id: &CheckoutId,
    address_type: AddressType,
    result: Result<Option<CheckoutAddressPayload>, CommerceError>,
) -> AppResult<()> {
    let address_type = address_type.as_str();

    let payload = result.map_err(|e| {
        error!(
            checkout_id = %checkout_id,
            address_type,
            error = %e,
            "Failed to update checkout address"
        );
        Vec::<AppErr>::from(e)
    })?;

    let Some(payload) = payload else {
        error!(
            checkout_id = %checkout_id,
            address_type,
            "Checkout address update mutation returned no data"
        );
        return Err(vec![AppErr::new(ErrorCode::CheckoutAddressUpdate)]);
    };

    if !payload.errors.is_empty() {
        error!(
            checkout_id = %checkout_id,
            address_type,
            errors = ?payload.errors,
            "Checkout address update mutation returned errors"
        );
        return Err(handle_mutation_errors(payload.errors));
    }

    if payload.checkout.is_none() {
        error!(
            checkout_id = %checkout_id,
            address_type,
            "Checkout address update mutation returned no checkout"
        );
        return Err(vec![AppErr::new(ErrorCode::CheckoutAddressUpdate)]);
    }

    Ok(())
}

fn order_create_result(
    checkout_id: &CheckoutId,
    result: Result<checkout_complete::ResponseData, CommerceError>,
) -> AppResult<OrderCreated> {
    let data = result.map_err(|e| {
        error!(checkout_id = %checkout_id, error = %e, "Failed to complete checkout");
        Vec::<AppErr>::from(e)
    })?;

    let Some(payload) = data.checkout_complete else {
        error!(checkout_id = %checkout_id, "Checkout complete mutation returned no data");
        return Err(vec![AppErr::new(ErrorCode::CheckoutComplete)]);
    };

    if !payload.errors.is_empty() {
        error!(
            checkout_id = %checkout_id,
            errors = ?payload.errors,
            "Checkout complete mutation returned errors"
        );
        return Err(handle_mutation_errors(payload.errors));
    }

    let Some(order) = payload.order else {
        error!(checkout_id = %checkout_id, "Checkout complete mutation returned no order");
        return Err(vec![AppErr::new(ErrorCode::CheckoutComplete)]);
    };

    Ok(OrderCreated {
        order_id: OrderId::new(order.id),
    })
}
