//! Supported locales and the markets they sell into.
//!
//! Each locale maps to exactly one market, which fixes the sales channel and
//! currency used when talking to the commerce API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A language the storefront is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub id: &'static str,
    pub name: &'static str,
    /// Language code as the commerce API expects it (e.g., `EN_GB`).
    pub code: &'static str,
    pub locale: Locale,
}

/// A sales region bound to one commerce channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Market {
    pub id: &'static str,
    pub name: &'static str,
    pub channel: &'static str,
    pub currency: &'static str,
    pub continent: &'static str,
    pub country_code: &'static str,
    pub default_language: Language,
    pub supported_languages: &'static [Language],
}

pub const LANGUAGE_GB: Language = Language {
    id: "gb",
    name: "English (British)",
    code: "EN_GB",
    locale: Locale::EnGb,
};

pub const MARKET_GB: Market = Market {
    id: "gb",
    name: "Europe",
    channel: "eu",
    currency: "EUR",
    continent: "Europe",
    country_code: "GB",
    default_language: LANGUAGE_GB,
    supported_languages: &[LANGUAGE_GB],
};

/// Locale rejected by routing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale: {0}")]
pub struct LocaleError(pub String);

/// Locales the storefront routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-GB")]
    EnGb,
}

impl Locale {
    /// All routed locales.
    pub const ALL: &'static [Self] = &[Self::EnGb];

    /// BCP 47 tag used in URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnGb => "en-GB",
        }
    }

    /// Market served under this locale.
    #[must_use]
    pub const fn market(self) -> &'static Market {
        match self {
            Self::EnGb => &MARKET_GB,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|locale| locale.as_str() == s)
            .ok_or_else(|| LocaleError(s.to_string()))
    }
}
