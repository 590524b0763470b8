//! Conversion of raw API fragments into `tillpoint_core` domain types.

use tracing::warn;

use tillpoint_core::{
    Address, Checkout, CheckoutId, CheckoutProblems, GiftCard, GiftCardId,
    InsufficientStockProblem, Line, LineId, Money, PriceType, TaxedMoney,
    VariantNotAvailableProblem,
};

use super::fragments::{
    AddressFragment, CheckoutLineFragment, CheckoutProblemFragment, GiftCardFragment,
    MoneyFragment, TaxedMoneyFragment,
};
use super::queries::checkout_query::CheckoutQueryCheckout;

pub fn serialize_money(data: MoneyFragment) -> Money {
    Money::new(data.amount, data.currency)
}

fn serialize_taxed_money(data: TaxedMoneyFragment) -> TaxedMoney {
    TaxedMoney {
        gross: serialize_money(data.gross),
        net: serialize_money(data.net),
    }
}

/// Convert a gift card fragment, keeping its codes verbatim.
pub fn serialize_gift_card(data: GiftCardFragment) -> GiftCard {
    GiftCard {
        id: GiftCardId::new(data.id),
        display_code: data.display_code,
        last4_code_chars: data.last4_code_chars,
        current_balance: serialize_money(data.current_balance),
        initial_balance: serialize_money(data.initial_balance),
    }
}

/// Convert a checkout line, resolving each price to the display mode.
pub fn serialize_line(data: CheckoutLineFragment, price_type: PriceType) -> Line {
    let price = |taxed: TaxedMoneyFragment| serialize_taxed_money(taxed).select(price_type).clone();

    Line {
        id: LineId::new(data.id),
        quantity: data.quantity,
        product_name: data.variant.product.name,
        variant_name: data.variant.name,
        sku: data.variant.sku,
        thumbnail: data.variant.product.thumbnail.map(|t| t.url),
        unit_price: price(data.unit_price),
        total_price: price(data.total_price),
        undiscounted_total_price: price(data.undiscounted_total_price),
    }
}

pub fn serialize_address(data: AddressFragment) -> Address {
    Address {
        first_name: data.first_name,
        last_name: data.last_name,
        company_name: data.company_name.filter(|s| !s.is_empty()),
        street_address1: data.street_address1,
        street_address2: data.street_address2.filter(|s| !s.is_empty()),
        city: data.city,
        city_area: data.city_area.filter(|s| !s.is_empty()),
        postal_code: data.postal_code,
        country_code: data.country.code,
        country_area: data.country_area.filter(|s| !s.is_empty()),
        phone: data.phone.filter(|s| !s.is_empty()),
    }
}

/// Sort reported problems into their categories.
///
/// A missing list yields two empty categories. Problem kinds this client does
/// not know are logged and skipped.
pub fn serialize_checkout_problems(
    data: Option<Vec<CheckoutProblemFragment>>,
    price_type: PriceType,
) -> CheckoutProblems {
    let mut problems = CheckoutProblems::default();

    for problem in data.unwrap_or_default() {
        match problem {
            CheckoutProblemFragment::CheckoutLineProblemInsufficientStock {
                available_quantity,
                line,
            } => problems.insufficient_stock.push(InsufficientStockProblem {
                line: serialize_line(line, price_type),
                available_quantity,
            }),
            CheckoutProblemFragment::CheckoutLineProblemVariantNotAvailable { line } => {
                problems
                    .variant_not_available
                    .push(VariantNotAvailableProblem {
                        line: serialize_line(line, price_type),
                    });
            }
            CheckoutProblemFragment::Unknown => {
                warn!("Unknown checkout problem type, skipping");
            }
        }
    }

    problems
}

pub fn serialize_checkout(data: CheckoutQueryCheckout, price_type: PriceType) -> Checkout {
    Checkout {
        id: CheckoutId::new(data.id),
        email: data.email,
        shipping_address: data.shipping_address.map(serialize_address),
        billing_address: data.billing_address.map(serialize_address),
        voucher_code: data.voucher_code.filter(|code| !code.is_empty()),
        used_gift_cards: data.gift_cards.into_iter().map(serialize_gift_card).collect(),
        lines: data
            .lines
            .into_iter()
            .map(|line| serialize_line(line, price_type))
            .collect(),
        problems: serialize_checkout_problems(data.problems, price_type),
    }
}
