//! Service seams between server actions and the commerce API.
//!
//! Actions depend on these traits rather than on [`CommerceClient`] directly
//! so they can run against in-memory doubles in tests.
//!
//! [`CommerceClient`]: crate::commerce::CommerceClient

use async_trait::async_trait;
use secrecy::SecretString;

use tillpoint_core::{
    Address, AddressFormInput, AddressType, AppResult, Checkout, CheckoutId, OrderCreated,
    PriceType, PromoCodeRef, PromoCodeResult,
};

/// Checkout operations.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Fetch a checkout with line prices resolved to `price_type`.
    async fn checkout_get(
        &self,
        checkout_id: &CheckoutId,
        price_type: PriceType,
    ) -> AppResult<Checkout>;

    async fn add_promo_code(
        &self,
        checkout_id: &CheckoutId,
        promo_code: &str,
    ) -> AppResult<PromoCodeResult>;

    async fn remove_promo_code(
        &self,
        checkout_id: &CheckoutId,
        promo_code: &PromoCodeRef,
    ) -> AppResult<PromoCodeResult>;

    /// Write `address` into the billing or shipping slot of a checkout.
    async fn checkout_address_update(
        &self,
        checkout_id: &CheckoutId,
        address: &Address,
        address_type: AddressType,
    ) -> AppResult<()>;

    /// Place an order from the checkout.
    async fn order_create(&self, checkout_id: &CheckoutId) -> AppResult<OrderCreated>;
}

/// Customer account operations.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Save an address to the signed-in customer's address book.
    async fn account_address_create(
        &self,
        access_token: &SecretString,
        input: &AddressFormInput,
        address_type: AddressType,
    ) -> AppResult<Address>;
}
