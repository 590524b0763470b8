//! Postal addresses for checkout and customer accounts.

use serde::{Deserialize, Serialize};

/// A normalized postal address as the commerce API stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub city: String,
    pub city_area: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    pub country_area: Option<String>,
    pub phone: Option<String>,
}

/// Which checkout (or account) address slot an address is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    Billing,
    Shipping,
}

impl AddressType {
    /// The API enum value for this address type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "BILLING",
            Self::Shipping => "SHIPPING",
        }
    }
}

/// Address fields as submitted by the checkout form.
///
/// Every field is free text; optional lines arrive as empty strings when the
/// customer leaves them blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressFormInput {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub street_address1: String,
    pub street_address2: String,
    pub city: String,
    pub city_area: String,
    pub postal_code: String,
    pub country: String,
    pub country_area: String,
    pub phone: String,
}

impl AddressFormInput {
    /// Convert submitted form fields into the normalized address shape.
    ///
    /// Fields are trimmed, blank optional fields become `None`, and the
    /// country code is upper-cased.
    #[must_use]
    pub fn to_address(&self) -> Address {
        Address {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            company_name: non_blank(&self.company_name),
            street_address1: self.street_address1.trim().to_string(),
            street_address2: non_blank(&self.street_address2),
            city: self.city.trim().to_string(),
            city_area: non_blank(&self.city_area),
            postal_code: self.postal_code.trim().to_string(),
            country_code: self.country.trim().to_ascii_uppercase(),
            country_area: non_blank(&self.country_area),
            phone: non_blank(&self.phone),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_to_address_normalizes_fields() {
        let form = AddressFormInput {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            street_address1: "12 St James's Square".to_string(),
            street_address2: "   ".to_string(),
            city: "London".to_string(),
            postal_code: "SW1Y 4JH".to_string(),
            country: "gb".to_string(),
            phone: "+442071234567".to_string(),
            ..AddressFormInput::default()
        };

        let address = form.to_address();

        assert_eq!(address.first_name, "Ada");
        assert_eq!(address.street_address2, None);
        assert_eq!(address.company_name, None);
        assert_eq!(address.country_code, "GB");
        assert_eq!(address.phone.as_deref(), Some("+442071234567"));
    }

    #[test]
    fn test_address_type_wire_value() {
        assert_eq!(AddressType::Billing.as_str(), "BILLING");
        let json = serde_json::to_string(&AddressType::Shipping).expect("serialize");
        assert_eq!(json, "\"SHIPPING\"");
    }
}
