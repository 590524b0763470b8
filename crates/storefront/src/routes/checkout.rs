//! Checkout route handlers.
//!
//! The checkout id and customer token come from the session via
//! [`SessionContext`]; every handler loads the current checkout first, so a
//! visitor without one gets `CHECKOUT_NOT_FOUND_ERROR`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tillpoint_core::{AppErr, AppResult, Checkout, GiftCard, PromoCodeResult};

use super::{Success, json_body};
use crate::actions::checkout::{self as actions, BillingAddressInput};
use crate::components::{AppliedCode, DiscountCode, DiscountCodeView};
use crate::error::{AppError, Result, action_status, add_breadcrumb};
use crate::middleware::SessionContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPage {
    pub checkout: Checkout,
    pub discount_code: DiscountCodeView,
}

/// Body of `POST /promo-code`.
#[derive(Debug, Deserialize)]
pub struct AddPromoCodeInput {
    #[serde(default)]
    pub code: String,
}

/// Outcome of a promo code submit or removal, with the panel as it now stands.
///
/// Failures keep the panel so the client can show the field error or toast.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<AppErr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub used_gift_cards: Vec<GiftCard>,
    pub discount_code: DiscountCodeView,
}

impl IntoResponse for PromoCodeResponse {
    fn into_response(self) -> Response {
        let status = if self.ok {
            StatusCode::OK
        } else {
            action_status(&self.errors)
        };
        (status, Json(self)).into_response()
    }
}

async fn load_checkout(state: &AppState, ctx: &SessionContext) -> Result<Checkout> {
    let checkouts = state.checkouts().as_ref();
    Ok(actions::current_checkout(checkouts, ctx, state.config().price_type).await?)
}

/// Reload the checkout so the panel shows the codes the API now holds.
async fn refresh_panel(state: &AppState, ctx: &SessionContext, discount: &DiscountCode) {
    match load_checkout(state, ctx).await {
        Ok(checkout) => discount.sync(&checkout),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to reload checkout after promo code change");
        }
    }
}

/// Current checkout with its promo code panel.
#[instrument(
    skip_all,
    fields(locale = %ctx.locale, channel = ctx.locale.market().channel)
)]
pub async fn show(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<impl IntoResponse> {
    let checkout = load_checkout(&state, &ctx).await?;
    let discount_code = state
        .discount_panel(&checkout, ctx.locale)
        .await
        .lock()
        .await
        .view();

    Ok(Success::new(CheckoutPage {
        checkout,
        discount_code,
    }))
}

/// Apply a promo code.
#[instrument(
    skip_all,
    fields(locale = %ctx.locale, channel = ctx.locale.market().channel)
)]
pub async fn add_promo_code(
    State(state): State<AppState>,
    ctx: SessionContext,
    payload: std::result::Result<Json<AddPromoCodeInput>, JsonRejection>,
) -> Result<PromoCodeResponse> {
    let input = json_body(payload)?;
    let checkout = load_checkout(&state, &ctx).await?;
    add_breadcrumb(
        "checkout",
        "Promo code submitted",
        &[("checkout_id", checkout.id.as_str())],
    );

    let panel = state.discount_panel(&checkout, ctx.locale).await;
    let mut discount = panel.lock().await;
    discount.set_open(true);
    discount.set_code(input.code);
    let result = discount.submit().await;
    if result.is_ok() {
        refresh_panel(&state, &ctx, &discount).await;
    }

    Ok(promo_code_response(result, discount.view()))
}

/// Remove an applied promo code: gift cards by `id`, vouchers by `displayCode`.
#[instrument(
    skip_all,
    fields(locale = %ctx.locale, channel = ctx.locale.market().channel)
)]
pub async fn remove_promo_code(
    State(state): State<AppState>,
    ctx: SessionContext,
    payload: std::result::Result<Json<AppliedCode>, JsonRejection>,
) -> Result<PromoCodeResponse> {
    let code = json_body(payload)?;
    if code.id.is_none() && code.display_code.trim().is_empty() {
        return Err(AppError::BadRequest(
            "either id or displayCode is required".to_string(),
        ));
    }

    let checkout = load_checkout(&state, &ctx).await?;
    add_breadcrumb(
        "checkout",
        "Promo code removal requested",
        &[("checkout_id", checkout.id.as_str())],
    );

    let panel = state.discount_panel(&checkout, ctx.locale).await;
    let mut discount = panel.lock().await;
    let result = discount.remove(&code).await;
    if result.is_ok() {
        refresh_panel(&state, &ctx, &discount).await;
    }

    Ok(promo_code_response(result, discount.view()))
}

fn promo_code_response(
    result: AppResult<PromoCodeResult>,
    discount_code: DiscountCodeView,
) -> PromoCodeResponse {
    match result {
        Ok(result) => PromoCodeResponse {
            ok: result.success,
            errors: Vec::new(),
            used_gift_cards: result.used_gift_cards,
            discount_code,
        },
        Err(errors) => PromoCodeResponse {
            ok: false,
            errors,
            used_gift_cards: Vec::new(),
            discount_code,
        },
    }
}

/// Set the billing address, optionally saving it to the customer's account.
#[instrument(
    skip_all,
    fields(locale = %ctx.locale, channel = ctx.locale.market().channel)
)]
pub async fn update_billing_address(
    State(state): State<AppState>,
    ctx: SessionContext,
    payload: std::result::Result<Json<BillingAddressInput>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let input = json_body(payload)?;
    let checkout = load_checkout(&state, &ctx).await?;

    actions::update_billing_address(
        state.checkouts().as_ref(),
        state.users(),
        &ctx,
        &checkout,
        &input,
    )
    .await?;

    Ok(Success::new(serde_json::json!({})))
}

/// Place the order and send the client to its confirmation page.
#[instrument(
    skip_all,
    fields(locale = %ctx.locale, channel = ctx.locale.market().channel)
)]
pub async fn create_order(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Redirect> {
    add_breadcrumb("checkout", "Order placement started", &[]);
    let redirect = actions::order_create(state.checkouts().as_ref(), &ctx).await?;
    Ok(Redirect::to(&redirect.href))
}
