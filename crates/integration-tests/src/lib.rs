//! Integration tests for the Tillpoint storefront.
//!
//! Tests drive the real router (routes, session layer, request ID, rate
//! limiting) with `tower::ServiceExt::oneshot`. The commerce API is replaced
//! by [`InMemoryCommerce`], which keeps one checkout in memory and applies
//! mutations to it the way the API would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tillpoint-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
    routing::post,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::Session;

use tillpoint_core::{
    Address, AddressFormInput, AddressType, AppErr, AppResult, Checkout, CheckoutId,
    CheckoutProblems, ErrorCode, GiftCard, GiftCardId, Money, OrderCreated, OrderId, PriceType,
    PromoCodeRef, PromoCodeResult,
};
use tillpoint_storefront::config::{CommerceApiConfig, StorefrontConfig};
use tillpoint_storefront::i18n::Catalogs;
use tillpoint_storefront::middleware::{set_checkout_id, set_customer_access_token};
use tillpoint_storefront::routes;
use tillpoint_storefront::services::{CheckoutService, UserService};
use tillpoint_storefront::state::AppState;

/// Checkout id the commerce fake knows about.
pub const CHECKOUT_ID: &str = "Q2hlY2tvdXQ6MQ==";

/// Voucher the commerce fake accepts.
pub const VOUCHER: &str = "SAVE10";

/// Gift card code the commerce fake accepts.
pub const GIFT_CARD_CODE: &str = "GIFT-9F2A";

/// Order id handed out on completion.
pub const ORDER_ID: &str = "T3JkZXI6MQ==";

/// Client IP sent with every request so the rate limiter can key on it.
pub const CLIENT_IP: &str = "203.0.113.9";

#[derive(Debug, Default)]
struct CommerceState {
    checkout: Option<Checkout>,
    saved_addresses: Vec<(AddressFormInput, AddressType)>,
    orders_placed: usize,
    unavailable: bool,
}

/// Commerce API stand-in holding one checkout.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommerce {
    state: Arc<Mutex<CommerceState>>,
}

impl InMemoryCommerce {
    /// A commerce API with an empty checkout shipping to London.
    #[must_use]
    pub fn with_checkout() -> Self {
        let commerce = Self::default();
        commerce.state.lock().unwrap().checkout = Some(Checkout {
            id: CheckoutId::new(CHECKOUT_ID),
            email: Some("ada@example.com".to_string()),
            shipping_address: Some(shipping_address()),
            billing_address: None,
            voucher_code: None,
            used_gift_cards: Vec::new(),
            lines: Vec::new(),
            problems: CheckoutProblems::default(),
        });
        commerce
    }

    /// Snapshot of the stored checkout.
    #[must_use]
    pub fn checkout(&self) -> Option<Checkout> {
        self.state.lock().unwrap().checkout.clone()
    }

    /// Addresses saved to the customer's account.
    #[must_use]
    pub fn saved_addresses(&self) -> Vec<(AddressFormInput, AddressType)> {
        self.state.lock().unwrap().saved_addresses.clone()
    }

    #[must_use]
    pub fn orders_placed(&self) -> usize {
        self.state.lock().unwrap().orders_placed
    }

    /// Make every following call fail as if the API were unreachable.
    pub fn go_down(&self) {
        self.state.lock().unwrap().unavailable = true;
    }

    fn with_checkout_mut<T>(
        &self,
        checkout_id: &CheckoutId,
        not_found: ErrorCode,
        f: impl FnOnce(&mut Checkout) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(vec![
                AppErr::new(ErrorCode::Http).with_message("connection refused"),
            ]);
        }
        match state.checkout.as_mut() {
            Some(checkout) if checkout.id == *checkout_id => f(checkout),
            _ => Err(vec![AppErr::new(not_found)]),
        }
    }
}

fn money(amount: i64) -> Money {
    Money::new(Decimal::new(amount, 0), "EUR")
}

fn shipping_address() -> Address {
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

fn gift_card() -> GiftCard {
    GiftCard {
        id: GiftCardId::new("R2lmdENhcmQ6MQ=="),
        display_code: GIFT_CARD_CODE.to_string(),
        last4_code_chars: "9F2A".to_string(),
        current_balance: money(25),
        initial_balance: money(50),
    }
}

fn promo_result(checkout: &Checkout) -> PromoCodeResult {
    PromoCodeResult {
        success: true,
        used_gift_cards: checkout.used_gift_cards.clone(),
    }
}

#[async_trait]
impl CheckoutService for InMemoryCommerce {
    async fn checkout_get(
        &self,
        checkout_id: &CheckoutId,
        _price_type: PriceType,
    ) -> AppResult<Checkout> {
        self.with_checkout_mut(checkout_id, ErrorCode::CheckoutNotFound, |checkout| {
            Ok(checkout.clone())
        })
    }

    async fn add_promo_code(
        &self,
        checkout_id: &CheckoutId,
        promo_code: &str,
    ) -> AppResult<PromoCodeResult> {
        self.with_checkout_mut(checkout_id, ErrorCode::DiscountCodeAdd, |checkout| {
            match promo_code {
                VOUCHER => checkout.voucher_code = Some(VOUCHER.to_string()),
                GIFT_CARD_CODE => checkout.used_gift_cards.push(gift_card()),
                _ => {
                    return Err(vec![
                        AppErr::new(ErrorCode::InvalidValue)
                            .with_field("promoCode")
                            .with_message("Promo code is invalid"),
                    ]);
                }
            }
            Ok(promo_result(checkout))
        })
    }

    async fn remove_promo_code(
        &self,
        checkout_id: &CheckoutId,
        promo_code: &PromoCodeRef,
    ) -> AppResult<PromoCodeResult> {
        self.with_checkout_mut(checkout_id, ErrorCode::DiscountCodeRemove, |checkout| {
            match promo_code {
                PromoCodeRef::Id(id) => {
                    checkout.used_gift_cards.retain(|g| g.id.as_str() != id);
                }
                PromoCodeRef::Code(code) => {
                    if checkout.voucher_code.as_deref() == Some(code.as_str()) {
                        checkout.voucher_code = None;
                    }
                }
            }
            Ok(promo_result(checkout))
        })
    }

    async fn checkout_address_update(
        &self,
        checkout_id: &CheckoutId,
        address: &Address,
        address_type: AddressType,
    ) -> AppResult<()> {
        self.with_checkout_mut(checkout_id, ErrorCode::CheckoutAddressUpdate, |checkout| {
            if address.postal_code.is_empty() {
                return Err(vec![
                    AppErr::new(ErrorCode::Required)
                        .with_field("postalCode")
                        .with_message("This field is required."),
                ]);
            }
            match address_type {
                AddressType::Billing => checkout.billing_address = Some(address.clone()),
                AddressType::Shipping => checkout.shipping_address = Some(address.clone()),
            }
            Ok(())
        })
    }

    async fn order_create(&self, checkout_id: &CheckoutId) -> AppResult<OrderCreated> {
        let created =
            self.with_checkout_mut(checkout_id, ErrorCode::CheckoutComplete, |checkout| {
                if checkout.billing_address.is_none() {
                    return Err(vec![
                        AppErr::new(ErrorCode::Required)
                            .with_field("billingAddress")
                            .with_message("Billing address is not set"),
                    ]);
                }
                Ok(OrderCreated {
                    order_id: OrderId::new(ORDER_ID),
                })
            })?;
        self.state.lock().unwrap().orders_placed += 1;
        Ok(created)
    }
}

#[async_trait]
impl UserService for InMemoryCommerce {
    async fn account_address_create(
        &self,
        _access_token: &SecretString,
        input: &AddressFormInput,
        address_type: AddressType,
    ) -> AppResult<Address> {
        self.state
            .lock()
            .unwrap()
            .saved_addresses
            .push((input.clone(), address_type));
        Ok(input.to_address())
    }
}

/// Storefront configuration pointing at a commerce API that is never called.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        price_type: PriceType::Gross,
        commerce: CommerceApiConfig {
            api_url: "http://commerce.invalid/graphql/".parse().unwrap(),
            app_token: None,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Path of the route that seeds the session in tests.
const SEED_SESSION_PATH: &str = "/test/session";

/// Seed the session the way cart creation and sign-in would.
///
/// Body: `{"checkoutId": "...", "accessToken": "..."}`, both optional.
async fn seed_session(session: Session, Json(seed): Json<Value>) -> StatusCode {
    if let Some(checkout_id) = seed["checkoutId"].as_str() {
        set_checkout_id(&session, &CheckoutId::new(checkout_id))
            .await
            .unwrap();
    }
    if let Some(token) = seed["accessToken"].as_str() {
        set_customer_access_token(&session, &SecretString::from(token.to_string()))
            .await
            .unwrap();
    }
    StatusCode::NO_CONTENT
}

/// A response with its body parsed as JSON (`Value::Null` when empty).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> &str {
        self.headers[header::LOCATION].to_str().unwrap()
    }

    /// Error codes of a failure body.
    #[must_use]
    pub fn error_codes(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e["code"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The storefront router plus a cookie jar of one session.
pub struct TestApp {
    pub commerce: InMemoryCommerce,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    #[must_use]
    pub fn new(commerce: InMemoryCommerce) -> Self {
        let state = AppState::from_parts(
            test_config(),
            Arc::new(commerce.clone()),
            Arc::new(commerce.clone()),
            Catalogs::load().unwrap(),
        );
        let router = routes::routes()
            .unwrap()
            .route(SEED_SESSION_PATH, post(seed_session));

        Self {
            commerce,
            router: tillpoint_storefront::with_middleware(router, state),
            cookie: None,
        }
    }

    /// App whose visitor already has the fake's checkout in their session.
    pub async fn with_checkout() -> Self {
        let mut app = Self::new(InMemoryCommerce::with_checkout());
        app.seed(serde_json::json!({ "checkoutId": CHECKOUT_ID }))
            .await;
        app
    }

    /// Write values into the visitor's session.
    pub async fn seed(&mut self, seed: Value) {
        let response = self.request(Method::POST, SEED_SESSION_PATH, Some(seed)).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::DELETE, uri, Some(body)).await
    }

    /// Send a request, keeping the session cookie across calls.
    pub async fn request(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("cf-connecting-ip", CLIENT_IP);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
