//! Checkout actions: fetching, billing address, order placement.

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use tillpoint_core::{
    Address, AddressFormInput, AddressType, AppErr, AppResult, Checkout, ErrorCode, PriceType,
};

use super::ActionContext;
use crate::paths;
use crate::services::{CheckoutService, UserService};

/// Billing step of the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingAddressInput {
    pub same_as_shipping_address: bool,
    pub billing_address: Option<AddressFormInput>,
    pub save_address_for_future_use: bool,
}

/// Where the client should navigate once the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRedirect {
    pub href: String,
}

/// Load the visitor's checkout.
#[instrument(skip_all)]
pub async fn current_checkout(
    checkouts: &dyn CheckoutService,
    ctx: &dyn ActionContext,
    price_type: PriceType,
) -> AppResult<Checkout> {
    let Some(checkout_id) = ctx.checkout_id().await else {
        return Err(vec![AppErr::new(ErrorCode::CheckoutNotFound)]);
    };

    checkouts.checkout_get(&checkout_id, price_type).await
}

/// Set the checkout's billing address.
///
/// The billing update decides the result. Saving the address to the
/// customer's account is best-effort: it is attempted even when the update
/// fails, and its own outcome is only logged.
#[instrument(skip_all, fields(checkout_id = %checkout.id))]
pub async fn update_billing_address(
    checkouts: &dyn CheckoutService,
    users: &dyn UserService,
    ctx: &dyn ActionContext,
    checkout: &Checkout,
    input: &BillingAddressInput,
) -> AppResult<()> {
    let result = match billing_address(checkout, input) {
        Ok(address) => {
            checkouts
                .checkout_address_update(&checkout.id, &address, AddressType::Billing)
                .await
        }
        Err(errors) => Err(errors),
    };

    if input.save_address_for_future_use {
        save_address_for_future_use(users, ctx, input.billing_address.as_ref()).await;
    }

    result
}

fn billing_address(checkout: &Checkout, input: &BillingAddressInput) -> AppResult<Address> {
    if input.same_as_shipping_address {
        return checkout.shipping_address.clone().ok_or_else(|| {
            error!(
                checkout_id = %checkout.id,
                "Billing same as shipping requested but checkout has no shipping address"
            );
            vec![AppErr::new(ErrorCode::CheckoutAddressMissing)]
        });
    }

    input
        .billing_address
        .as_ref()
        .map(AddressFormInput::to_address)
        .ok_or_else(|| {
            vec![
                AppErr::new(ErrorCode::Required)
                    .with_field("billingAddress")
                    .with_message("Billing address is required"),
            ]
        })
}

async fn save_address_for_future_use(
    users: &dyn UserService,
    ctx: &dyn ActionContext,
    form: Option<&AddressFormInput>,
) {
    let Some(form) = form else {
        warn!("No billing address submitted, nothing to save");
        return;
    };
    let Some(access_token) = ctx.access_token().await else {
        warn!("Cannot save billing address without a signed-in customer");
        return;
    };

    match users
        .account_address_create(&access_token, form, AddressType::Billing)
        .await
    {
        Ok(_) => info!("Billing address saved for future use"),
        Err(errors) => warn!(
            errors = %join_messages(&errors),
            "Saving billing address for future use failed"
        ),
    }
}

/// Place an order from the visitor's checkout.
///
/// On success the caller must navigate to the returned confirmation page;
/// nothing else is left to do for the request.
#[instrument(skip_all)]
pub async fn order_create(
    checkouts: &dyn CheckoutService,
    ctx: &dyn ActionContext,
) -> AppResult<OrderRedirect> {
    let Some(checkout_id) = ctx.checkout_id().await else {
        error!("Checkout not found while creating an order");
        return Err(vec![AppErr::new(ErrorCode::CheckoutNotFound)]);
    };

    let (locale, result) = tokio::join!(ctx.locale(), checkouts.order_create(&checkout_id));

    match result {
        Ok(created) => Ok(OrderRedirect {
            href: paths::order_confirmation(locale, &created.order_id, true),
        }),
        Err(errors) => {
            error!(
                checkout_id = %checkout_id,
                message = %join_messages(&errors),
                "Order creation from checkout failed"
            );
            Err(vec![AppErr::new(ErrorCode::CheckoutComplete)])
        }
    }
}

/// Forget the visitor's checkout once its order has been confirmed.
#[instrument(skip_all)]
pub async fn clear_checkout(ctx: &dyn ActionContext) {
    ctx.clear_checkout_id().await;
    info!("Checkout cleared after order placement");
}

fn join_messages(errors: &[AppErr]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_deref().unwrap_or_else(|| e.code.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{
        Call, CallLog, FakeCheckoutService, FakeContext, FakeUserService, checkout, err,
    };

    fn form() -> AddressFormInput {
        AddressFormInput {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            street_address1: "1 Navy Way".to_string(),
            city: "Bath".to_string(),
            postal_code: "BA1 1AA".to_string(),
            country: "gb".to_string(),
            ..AddressFormInput::default()
        }
    }

    fn signed_in() -> FakeContext {
        FakeContext {
            access_token: Some("customer-token".to_string()),
            ..FakeContext::with_checkout("Q2hlY2tvdXQ6MQ==")
        }
    }

    // -------------------------------------------------------------------------
    // update_billing_address
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_billing_same_as_shipping_reuses_shipping_address() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());
        let users = FakeUserService::new(log.clone());
        let checkout = checkout();
        let input = BillingAddressInput {
            same_as_shipping_address: true,
            ..BillingAddressInput::default()
        };

        let result =
            update_billing_address(&checkouts, &users, &signed_in(), &checkout, &input).await;

        assert!(result.is_ok());
        assert_eq!(
            log.calls(),
            vec![Call::AddressUpdate(
                checkout.shipping_address.clone().unwrap(),
                AddressType::Billing
            )]
        );
    }

    #[tokio::test]
    async fn test_billing_form_is_normalized() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());
        let users = FakeUserService::new(log.clone());
        let input = BillingAddressInput {
            billing_address: Some(form()),
            ..BillingAddressInput::default()
        };

        update_billing_address(&checkouts, &users, &signed_in(), &checkout(), &input)
            .await
            .unwrap();

        let calls = log.calls();
        let Some(Call::AddressUpdate(address, AddressType::Billing)) = calls.first() else {
            panic!("expected billing update, got {calls:?}");
        };
        assert_eq!(address.country_code, "GB");
        assert_eq!(address.street_address2, None);
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn test_save_for_future_use_attempted_when_update_fails() {
        let log = CallLog::default();
        let mut checkouts = FakeCheckoutService::new(log.clone());
        checkouts.address_update = err(ErrorCode::InvalidValue);
        let users = FakeUserService::new(log.clone());
        let input = BillingAddressInput {
            billing_address: Some(form()),
            save_address_for_future_use: true,
            ..BillingAddressInput::default()
        };

        let result =
            update_billing_address(&checkouts, &users, &signed_in(), &checkout(), &input).await;

        assert_eq!(result.unwrap_err()[0].code, ErrorCode::InvalidValue);
        assert!(
            log.calls()
                .contains(&Call::AccountAddressCreate(form(), AddressType::Billing))
        );
    }

    #[tokio::test]
    async fn test_save_failure_does_not_change_result() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());
        let mut users = FakeUserService::new(log.clone());
        users.result = err(ErrorCode::AccountAddressCreate);
        let input = BillingAddressInput {
            billing_address: Some(form()),
            save_address_for_future_use: true,
            ..BillingAddressInput::default()
        };

        let result =
            update_billing_address(&checkouts, &users, &signed_in(), &checkout(), &input).await;

        assert!(result.is_ok());
        assert_eq!(log.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_save_skipped_without_access_token() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());
        let users = FakeUserService::new(log.clone());
        let input = BillingAddressInput {
            billing_address: Some(form()),
            save_address_for_future_use: true,
            ..BillingAddressInput::default()
        };
        let ctx = FakeContext::with_checkout("Q2hlY2tvdXQ6MQ==");

        let result = update_billing_address(&checkouts, &users, &ctx, &checkout(), &input).await;

        assert!(result.is_ok());
        assert_eq!(log.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_shipping_address_reported() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());
        let users = FakeUserService::new(log.clone());
        let mut checkout = checkout();
        checkout.shipping_address = None;
        let input = BillingAddressInput {
            same_as_shipping_address: true,
            ..BillingAddressInput::default()
        };

        let result =
            update_billing_address(&checkouts, &users, &signed_in(), &checkout, &input).await;

        assert_eq!(
            result.unwrap_err()[0].code,
            ErrorCode::CheckoutAddressMissing
        );
        assert!(log.calls().is_empty());
    }

    // -------------------------------------------------------------------------
    // order_create
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_order_create_without_checkout() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());

        let result = order_create(&checkouts, &FakeContext::default()).await;

        let errors = result.unwrap_err();
        assert_eq!(errors, vec![AppErr::new(ErrorCode::CheckoutNotFound)]);
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_order_create_redirects_to_confirmation() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());
        let ctx = FakeContext::with_checkout("Q2hlY2tvdXQ6MQ==");

        let redirect = order_create(&checkouts, &ctx).await.unwrap();

        assert_eq!(
            redirect.href,
            "/en-GB/order/confirmation/ORD-1?orderPlaced=true"
        );
    }

    #[tokio::test]
    async fn test_order_create_failure_collapses_to_complete_error() {
        let log = CallLog::default();
        let mut checkouts = FakeCheckoutService::new(log.clone());
        checkouts.order_create = Err(vec![
            AppErr::new(ErrorCode::InsufficientStock).with_message("Not enough stock"),
            AppErr::new(ErrorCode::Http),
        ]);
        let ctx = FakeContext::with_checkout("Q2hlY2tvdXQ6MQ==");

        let errors = order_create(&checkouts, &ctx).await.unwrap_err();

        assert_eq!(errors, vec![AppErr::new(ErrorCode::CheckoutComplete)]);
    }

    // -------------------------------------------------------------------------
    // current_checkout / clear_checkout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_current_checkout_requires_session_checkout() {
        let log = CallLog::default();
        let checkouts = FakeCheckoutService::new(log.clone());

        let result = current_checkout(&checkouts, &FakeContext::default(), PriceType::Gross).await;

        assert_eq!(result.unwrap_err()[0].code, ErrorCode::CheckoutNotFound);
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_checkout() {
        let ctx = FakeContext::with_checkout("Q2hlY2tvdXQ6MQ==");
        clear_checkout(&ctx).await;
        assert!(ctx.was_cleared());
    }

    #[test]
    fn test_join_messages_falls_back_to_code() {
        let errors = vec![
            AppErr::new(ErrorCode::InsufficientStock).with_message("Not enough stock"),
            AppErr::new(ErrorCode::Http),
        ];
        assert_eq!(join_messages(&errors), "Not enough stock, HTTP_ERROR");
    }
}
