//! Shared GraphQL selection sets and the raw shapes they deserialize into.
//!
//! Fragment text is exposed as macros so operations can splice it in with
//! `concat!` and keep every query a `&'static str`.

use rust_decimal::Decimal;
use serde::Deserialize;

macro_rules! money_fragment {
    () => {
        "fragment MoneyFragment on Money {
  amount
  currency
}
"
    };
}

macro_rules! gift_card_fragment {
    () => {
        "fragment GiftCardFragment on GiftCard {
  id
  displayCode
  last4CodeChars
  currentBalance {
    ...MoneyFragment
  }
  initialBalance {
    ...MoneyFragment
  }
}
"
    };
}

macro_rules! address_fragment {
    () => {
        "fragment AddressFragment on Address {
  id
  firstName
  lastName
  companyName
  streetAddress1
  streetAddress2
  city
  cityArea
  postalCode
  country {
    code
  }
  countryArea
  phone
}
"
    };
}

macro_rules! checkout_line_fragment {
    () => {
        "fragment CheckoutLineFragment on CheckoutLine {
  id
  quantity
  variant {
    name
    sku
    product {
      name
      thumbnail {
        url
      }
    }
  }
  unitPrice {
    gross {
      ...MoneyFragment
    }
    net {
      ...MoneyFragment
    }
  }
  totalPrice {
    gross {
      ...MoneyFragment
    }
    net {
      ...MoneyFragment
    }
  }
  undiscountedTotalPrice {
    gross {
      ...MoneyFragment
    }
    net {
      ...MoneyFragment
    }
  }
}
"
    };
}

macro_rules! checkout_problems_fragment {
    () => {
        "fragment CheckoutProblemsFragment on CheckoutProblem {
  __typename
  ... on CheckoutLineProblemInsufficientStock {
    availableQuantity
    line {
      ...CheckoutLineFragment
    }
  }
  ... on CheckoutLineProblemVariantNotAvailable {
    line {
      ...CheckoutLineFragment
    }
  }
}
"
    };
}

macro_rules! mutation_error_fragment {
    () => {
        "fragment MutationErrorFragment on Error {
  field
  message
  code
}
"
    };
}

pub(crate) use address_fragment;
pub(crate) use checkout_line_fragment;
pub(crate) use checkout_problems_fragment;
pub(crate) use gift_card_fragment;
pub(crate) use money_fragment;
pub(crate) use mutation_error_fragment;

#[derive(Debug, Clone, Deserialize)]
pub struct MoneyFragment {
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxedMoneyFragment {
    pub gross: MoneyFragment,
    pub net: MoneyFragment,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardFragment {
    pub id: String,
    pub display_code: String,
    pub last4_code_chars: String,
    pub current_balance: MoneyFragment,
    pub initial_balance: MoneyFragment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryFragment {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFragment {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub street_address1: String,
    #[serde(default)]
    pub street_address2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub city_area: Option<String>,
    pub postal_code: String,
    pub country: CountryFragment,
    #[serde(default)]
    pub country_area: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailFragment {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductFragment {
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailFragment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantFragment {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub product: ProductFragment,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineFragment {
    pub id: String,
    pub quantity: u32,
    pub variant: VariantFragment,
    pub unit_price: TaxedMoneyFragment,
    pub total_price: TaxedMoneyFragment,
    pub undiscounted_total_price: TaxedMoneyFragment,
}

/// A line-level checkout problem, discriminated by `__typename`.
///
/// Kinds added to the API after this client was written land in `Unknown`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum CheckoutProblemFragment {
    #[serde(rename_all = "camelCase")]
    CheckoutLineProblemInsufficientStock {
        available_quantity: u32,
        line: CheckoutLineFragment,
    },
    CheckoutLineProblemVariantNotAvailable {
        line: CheckoutLineFragment,
    },
    #[serde(other)]
    Unknown,
}

/// A business error reported inside a mutation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationErrorFragment {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_problem_kind_deserializes() {
        let problem: CheckoutProblemFragment =
            serde_json::from_value(serde_json::json!({ "__typename": "CheckoutProblemFuture" }))
                .expect("deserialize");
        assert!(matches!(problem, CheckoutProblemFragment::Unknown));
    }

    #[test]
    fn test_money_accepts_numeric_amount() {
        let money: MoneyFragment =
            serde_json::from_value(serde_json::json!({ "amount": 12.5, "currency": "EUR" }))
                .expect("deserialize");
        assert_eq!(money.amount, Decimal::new(125, 1));
    }

    #[test]
    fn test_fragment_text_is_spliceable() {
        let text = concat!(gift_card_fragment!(), money_fragment!());
        assert!(text.contains("fragment GiftCardFragment on GiftCard"));
        assert!(text.contains("fragment MoneyFragment on Money"));
    }
}
