//! Monetary values using decimal arithmetic.
//!
//! The commerce API reports every price as both gross and net. Which side the
//! storefront shows is a per-channel display decision captured by [`PriceType`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in a specific currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl Money {
    /// Create a new money value.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// A price reported both with and without taxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxedMoney {
    pub gross: Money,
    pub net: Money,
}

impl TaxedMoney {
    /// Pick the side of the price matching the display mode.
    #[must_use]
    pub const fn select(&self, price_type: PriceType) -> &Money {
        match price_type {
            PriceType::Gross => &self.gross,
            PriceType::Net => &self.net,
        }
    }
}

/// Price display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    #[default]
    Gross,
    Net,
}

impl FromStr for PriceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gross" => Ok(Self::Gross),
            "net" => Ok(Self::Net),
            other => Err(format!("unknown price type '{other}' (expected gross or net)")),
        }
    }
}
