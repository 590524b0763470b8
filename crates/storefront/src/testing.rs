//! In-memory doubles shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;

use tillpoint_core::{
    Address, AddressFormInput, AddressType, AppErr, AppResult, Checkout, CheckoutId,
    CheckoutProblems, ErrorCode, GiftCard, GiftCardId, Locale, Money, OrderCreated, OrderId,
    PriceType, PromoCodeRef, PromoCodeResult,
};

use crate::actions::ActionContext;
use crate::services::{CheckoutService, UserService};

/// A call observed by one of the fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CheckoutGet(CheckoutId),
    AddPromoCode(String),
    RemovePromoCode(PromoCodeRef),
    AddressUpdate(Address, AddressType),
    OrderCreate(CheckoutId),
    AccountAddressCreate(AddressFormInput, AddressType),
}

/// Calls in the order they were made, shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

pub fn err<T>(code: ErrorCode) -> AppResult<T> {
    Err(vec![AppErr::new(code)])
}

pub fn money(amount: i64) -> Money {
    Money::new(Decimal::new(amount, 0), "EUR")
}

pub fn gift_card(id: &str, display_code: &str) -> GiftCard {
    GiftCard {
        id: GiftCardId::new(id),
        display_code: display_code.to_string(),
        last4_code_chars: "9F2A".to_string(),
        current_balance: money(25),
        initial_balance: money(50),
    }
}

pub fn address() -> Address {
    AddressFormInput {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        street_address1: "12 St James's Square".to_string(),
        city: "London".to_string(),
        postal_code: "SW1Y 4JH".to_string(),
        country: "GB".to_string(),
        ..AddressFormInput::default()
    }
    .to_address()
}

pub fn checkout() -> Checkout {
    Checkout {
        id: CheckoutId::new("Q2hlY2tvdXQ6MQ=="),
        email: Some("ada@example.com".to_string()),
        shipping_address: Some(address()),
        billing_address: None,
        voucher_code: Some("SAVE10".to_string()),
        used_gift_cards: vec![gift_card("gc_1", "GIFT-9F2A")],
        lines: vec![],
        problems: CheckoutProblems::default(),
    }
}

/// Checkout service answering every call with a preset result.
pub struct FakeCheckoutService {
    pub checkout: AppResult<Checkout>,
    pub add_promo_code: AppResult<PromoCodeResult>,
    pub remove_promo_code: AppResult<PromoCodeResult>,
    pub address_update: AppResult<()>,
    pub order_create: AppResult<OrderCreated>,
    pub log: CallLog,
}

impl FakeCheckoutService {
    pub fn new(log: CallLog) -> Self {
        Self {
            checkout: Ok(checkout()),
            add_promo_code: Ok(PromoCodeResult {
                success: true,
                used_gift_cards: vec![],
            }),
            remove_promo_code: Ok(PromoCodeResult {
                success: true,
                used_gift_cards: vec![],
            }),
            address_update: Ok(()),
            order_create: Ok(OrderCreated {
                order_id: OrderId::new("ORD-1"),
            }),
            log,
        }
    }
}

#[async_trait]
impl CheckoutService for FakeCheckoutService {
    async fn checkout_get(
        &self,
        checkout_id: &CheckoutId,
        _price_type: PriceType,
    ) -> AppResult<Checkout> {
        self.log.push(Call::CheckoutGet(checkout_id.clone()));
        self.checkout.clone()
    }

    async fn add_promo_code(
        &self,
        _checkout_id: &CheckoutId,
        promo_code: &str,
    ) -> AppResult<PromoCodeResult> {
        self.log.push(Call::AddPromoCode(promo_code.to_string()));
        self.add_promo_code.clone()
    }

    async fn remove_promo_code(
        &self,
        _checkout_id: &CheckoutId,
        promo_code: &PromoCodeRef,
    ) -> AppResult<PromoCodeResult> {
        self.log.push(Call::RemovePromoCode(promo_code.clone()));
        self.remove_promo_code.clone()
    }

    async fn checkout_address_update(
        &self,
        _checkout_id: &CheckoutId,
        address: &Address,
        address_type: AddressType,
    ) -> AppResult<()> {
        self.log
            .push(Call::AddressUpdate(address.clone(), address_type));
        self.address_update.clone()
    }

    async fn order_create(&self, checkout_id: &CheckoutId) -> AppResult<OrderCreated> {
        self.log.push(Call::OrderCreate(checkout_id.clone()));
        self.order_create.clone()
    }
}

/// User service answering with a preset result.
pub struct FakeUserService {
    pub result: AppResult<Address>,
    pub log: CallLog,
}

impl FakeUserService {
    pub fn new(log: CallLog) -> Self {
        Self {
            result: Ok(address()),
            log,
        }
    }
}

#[async_trait]
impl UserService for FakeUserService {
    async fn account_address_create(
        &self,
        _access_token: &SecretString,
        input: &AddressFormInput,
        address_type: AddressType,
    ) -> AppResult<Address> {
        self.log
            .push(Call::AccountAddressCreate(input.clone(), address_type));
        self.result.clone()
    }
}

/// Request context with fixed values.
pub struct FakeContext {
    pub checkout_id: Option<CheckoutId>,
    pub access_token: Option<String>,
    pub locale: Locale,
    pub cleared: AtomicBool,
}

impl FakeContext {
    pub fn with_checkout(checkout_id: &str) -> Self {
        Self {
            checkout_id: Some(CheckoutId::new(checkout_id)),
            ..Self::default()
        }
    }

    pub fn was_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl Default for FakeContext {
    fn default() -> Self {
        Self {
            checkout_id: None,
            access_token: None,
            locale: Locale::EnGb,
            cleared: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ActionContext for FakeContext {
    async fn checkout_id(&self) -> Option<CheckoutId> {
        self.checkout_id.clone()
    }

    async fn access_token(&self) -> Option<SecretString> {
        self.access_token.clone().map(SecretString::from)
    }

    async fn locale(&self) -> Locale {
        self.locale
    }

    async fn clear_checkout_id(&self) {
        self.cleared.store(true, Ordering::SeqCst);
    }
}
