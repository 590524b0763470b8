//! Checkout aggregate and the values the commerce API hands back for it.
//!
//! None of these are computed locally: a checkout only changes through API
//! mutations, and each response is serialized into a fresh snapshot.

use serde::{Deserialize, Serialize};

use super::address::Address;
use super::id::{CheckoutId, GiftCardId, LineId, OrderId};
use super::money::Money;

/// An in-progress order prior to placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub id: CheckoutId,
    pub email: Option<String>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    /// Voucher code currently applied, if any.
    pub voucher_code: Option<String>,
    pub used_gift_cards: Vec<GiftCard>,
    pub lines: Vec<Line>,
    pub problems: CheckoutProblems,
}

/// A stored-value card applied to a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    pub id: GiftCardId,
    pub display_code: String,
    pub last4_code_chars: String,
    pub current_balance: Money,
    pub initial_balance: Money,
}

/// A checkout line with prices already resolved to one display mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: LineId,
    pub quantity: u32,
    pub product_name: String,
    pub variant_name: String,
    pub sku: Option<String>,
    pub thumbnail: Option<String>,
    pub unit_price: Money,
    pub total_price: Money,
    pub undiscounted_total_price: Money,
}

/// A line whose requested quantity exceeds available stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientStockProblem {
    pub line: Line,
    pub available_quantity: u32,
}

/// A line whose variant can no longer be purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNotAvailableProblem {
    pub line: Line,
}

/// Line-level problems reported for the current checkout contents.
///
/// Both lists are always present; an untroubled checkout has two empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutProblems {
    pub insufficient_stock: Vec<InsufficientStockProblem>,
    pub variant_not_available: Vec<VariantNotAvailableProblem>,
}

impl CheckoutProblems {
    /// Returns `true` when neither category has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insufficient_stock.is_empty() && self.variant_not_available.is_empty()
    }
}

/// Payload of a successful promo code add or remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeResult {
    pub success: bool,
    pub used_gift_cards: Vec<GiftCard>,
}

/// How a promo code to remove is identified.
///
/// Gift cards carry an ID; plain vouchers are only known by their code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromoCodeRef {
    Id(String),
    Code(String),
}

/// Payload of a successful order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: OrderId,
}
