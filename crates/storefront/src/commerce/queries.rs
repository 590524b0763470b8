//! GraphQL operations against the commerce API.
//!
//! Each operation follows the layout `graphql_client`'s derive generates: a
//! unit struct implementing [`GraphQLQuery`] plus a snake_case module holding
//! the query text, `Variables` and `ResponseData`. They are written out by hand
//! because the API schema is not vendored into this repository.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

use tillpoint_core::Address;

use super::fragments::{
    AddressFragment, CheckoutLineFragment, CheckoutProblemFragment, GiftCardFragment,
    MutationErrorFragment, address_fragment, checkout_line_fragment, checkout_problems_fragment,
    gift_card_fragment, money_fragment, mutation_error_fragment,
};

macro_rules! operation {
    ($name:ident, $module:ident) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Shared input types
// =============================================================================

/// Address as the commerce API accepts it in mutation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub city: String,
    pub city_area: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub country_area: Option<String>,
    pub phone: Option<String>,
}

impl From<&Address> for AddressInput {
    fn from(address: &Address) -> Self {
        Self {
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            company_name: address.company_name.clone(),
            street_address1: address.street_address1.clone(),
            street_address2: address.street_address2.clone(),
            city: address.city.clone(),
            city_area: address.city_area.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country_code.clone(),
            country_area: address.country_area.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Checkout carrying only the applied gift cards, returned by promo mutations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeCheckout {
    pub id: String,
    #[serde(default)]
    pub voucher_code: Option<String>,
    pub gift_cards: Vec<GiftCardFragment>,
}

/// Checkout reference returned by address mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRef {
    pub id: String,
}

/// Payload shared by the billing and shipping address mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutAddressPayload {
    pub checkout: Option<CheckoutRef>,
    pub errors: Vec<MutationErrorFragment>,
}

// =============================================================================
// Checkout query
// =============================================================================

operation!(CheckoutQuery, checkout_query);

pub mod checkout_query {
    use super::{
        AddressFragment, CheckoutLineFragment, CheckoutProblemFragment, Deserialize,
        GiftCardFragment, Serialize, address_fragment, checkout_line_fragment,
        checkout_problems_fragment, gift_card_fragment, money_fragment,
    };

    pub const OPERATION_NAME: &str = "CheckoutQuery";
    pub const QUERY: &str = concat!(
        "query CheckoutQuery($id: ID!) {
  checkout(id: $id) {
    id
    email
    voucherCode
    shippingAddress {
      ...AddressFragment
    }
    billingAddress {
      ...AddressFragment
    }
    giftCards {
      ...GiftCardFragment
    }
    lines {
      ...CheckoutLineFragment
    }
    problems {
      ...CheckoutProblemsFragment
    }
  }
}
",
        address_fragment!(),
        gift_card_fragment!(),
        checkout_line_fragment!(),
        checkout_problems_fragment!(),
        money_fragment!(),
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub checkout: Option<CheckoutQueryCheckout>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CheckoutQueryCheckout {
        pub id: String,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub voucher_code: Option<String>,
        #[serde(default)]
        pub shipping_address: Option<AddressFragment>,
        #[serde(default)]
        pub billing_address: Option<AddressFragment>,
        pub gift_cards: Vec<GiftCardFragment>,
        pub lines: Vec<CheckoutLineFragment>,
        #[serde(default)]
        pub problems: Option<Vec<CheckoutProblemFragment>>,
    }
}

// =============================================================================
// Promo code mutations
// =============================================================================

operation!(CheckoutAddPromoCodeMutation, checkout_add_promo_code);

pub mod checkout_add_promo_code {
    use super::{
        Deserialize, MutationErrorFragment, PromoCodeCheckout, Serialize, gift_card_fragment,
        money_fragment, mutation_error_fragment,
    };

    pub const OPERATION_NAME: &str = "CheckoutAddPromoCodeMutation";
    pub const QUERY: &str = concat!(
        "mutation CheckoutAddPromoCodeMutation($checkoutId: ID!, $promoCode: String!) {
  checkoutAddPromoCode(id: $checkoutId, promoCode: $promoCode) {
    checkout {
      id
      voucherCode
      giftCards {
        ...GiftCardFragment
      }
    }
    errors {
      ...MutationErrorFragment
    }
  }
}
",
        gift_card_fragment!(),
        money_fragment!(),
        mutation_error_fragment!(),
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
        pub promo_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_add_promo_code: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub checkout: Option<PromoCodeCheckout>,
        pub errors: Vec<MutationErrorFragment>,
    }
}

operation!(CheckoutRemovePromoCodeMutation, checkout_remove_promo_code);

pub mod checkout_remove_promo_code {
    use super::{
        Deserialize, MutationErrorFragment, PromoCodeCheckout, Serialize, gift_card_fragment,
        money_fragment, mutation_error_fragment,
    };

    pub const OPERATION_NAME: &str = "CheckoutRemovePromoCodeMutation";
    pub const QUERY: &str = concat!(
        "mutation CheckoutRemovePromoCodeMutation($checkoutId: ID!, $promoCode: String, $promoCodeId: ID) {
  checkoutRemovePromoCode(id: $checkoutId, promoCode: $promoCode, promoCodeId: $promoCodeId) {
    checkout {
      id
      voucherCode
      giftCards {
        ...GiftCardFragment
      }
    }
    errors {
      ...MutationErrorFragment
    }
  }
}
",
        gift_card_fragment!(),
        money_fragment!(),
        mutation_error_fragment!(),
    );

    /// Exactly one of `promo_code` and `promo_code_id` is set.
    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
        pub promo_code: Option<String>,
        pub promo_code_id: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_remove_promo_code: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub checkout: Option<PromoCodeCheckout>,
        pub errors: Vec<MutationErrorFragment>,
    }
}

// =============================================================================
// Address mutations
// =============================================================================

operation!(
    CheckoutBillingAddressUpdateMutation,
    checkout_billing_address_update
);

pub mod checkout_billing_address_update {
    use super::{AddressInput, Deserialize, Serialize, mutation_error_fragment};

    pub use super::CheckoutAddressPayload as Payload;

    pub const OPERATION_NAME: &str = "CheckoutBillingAddressUpdateMutation";
    pub const QUERY: &str = concat!(
        "mutation CheckoutBillingAddressUpdateMutation($checkoutId: ID!, $address: AddressInput!) {
  checkoutBillingAddressUpdate(id: $checkoutId, billingAddress: $address) {
    checkout {
      id
    }
    errors {
      ...MutationErrorFragment
    }
  }
}
",
        mutation_error_fragment!(),
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
        pub address: AddressInput,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_billing_address_update: Option<Payload>,
    }
}

operation!(
    CheckoutShippingAddressUpdateMutation,
    checkout_shipping_address_update
);

pub mod checkout_shipping_address_update {
    use super::{AddressInput, Deserialize, Serialize, mutation_error_fragment};

    pub use super::CheckoutAddressPayload as Payload;

    pub const OPERATION_NAME: &str = "CheckoutShippingAddressUpdateMutation";
    pub const QUERY: &str = concat!(
        "mutation CheckoutShippingAddressUpdateMutation($checkoutId: ID!, $address: AddressInput!) {
  checkoutShippingAddressUpdate(id: $checkoutId, shippingAddress: $address) {
    checkout {
      id
    }
    errors {
      ...MutationErrorFragment
    }
  }
}
",
        mutation_error_fragment!(),
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
        pub address: AddressInput,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_shipping_address_update: Option<Payload>,
    }
}

// =============================================================================
// Order placement
// =============================================================================

operation!(CheckoutCompleteMutation, checkout_complete);

pub mod checkout_complete {
    use super::{Deserialize, MutationErrorFragment, Serialize, mutation_error_fragment};

    pub const OPERATION_NAME: &str = "CheckoutCompleteMutation";
    pub const QUERY: &str = concat!(
        "mutation CheckoutCompleteMutation($checkoutId: ID!) {
  checkoutComplete(id: $checkoutId) {
    order {
      id
    }
    errors {
      ...MutationErrorFragment
    }
  }
}
",
        mutation_error_fragment!(),
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_complete: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub order: Option<OrderRef>,
        pub errors: Vec<MutationErrorFragment>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OrderRef {
        pub id: String,
    }
}

// =============================================================================
// Account mutations
// =============================================================================

operation!(AccountAddressCreateMutation, account_address_create);

pub mod account_address_create {
    use super::{
        AddressFragment, AddressInput, Deserialize, MutationErrorFragment, Serialize,
        address_fragment, mutation_error_fragment,
    };

    pub const OPERATION_NAME: &str = "AccountAddressCreateMutation";
    pub const QUERY: &str = concat!(
        "mutation AccountAddressCreateMutation($input: AddressInput!, $type: AddressTypeEnum) {
  accountAddressCreate(input: $input, type: $type) {
    address {
      ...AddressFragment
    }
    errors {
      ...MutationErrorFragment
    }
  }
}
",
        address_fragment!(),
        mutation_error_fragment!(),
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: AddressInput,
        #[serde(rename = "type")]
        pub address_type: &'static str,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub account_address_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Payload {
        pub address: Option<AddressFragment>,
        pub errors: Vec<MutationErrorFragment>,
    }
}
