//! Localized message catalogs.
//!
//! Catalogs are nested JSON objects compiled into the binary. Keys are looked
//! up by dotted path (`errors.UNKNOWN_ERROR`) and `{name}` placeholders are
//! filled from the supplied arguments. A missing key renders as the key itself
//! so untranslated strings are visible rather than blank.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use tillpoint_core::Locale;

const EN_GB: &str = include_str!("../messages/en-GB.json");

/// Messages for a single locale.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    catalog: Value,
}

impl Messages {
    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            catalog: serde_json::from_str(json)?,
        })
    }

    /// Load the bundled catalog for a locale.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog is malformed.
    pub fn for_locale(locale: Locale) -> Result<Self, serde_json::Error> {
        match locale {
            Locale::EnGb => Self::from_json(EN_GB),
        }
    }

    /// Translate `key`, without placeholders.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Translate `key`, replacing each `{name}` with its argument.
    #[must_use]
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let Some(template) = key
            .split('.')
            .try_fold(&self.catalog, |node, part| node.get(part))
            .and_then(Value::as_str)
        else {
            tracing::debug!(key, "Missing translation");
            return key.to_string();
        };

        args.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

/// Catalogs for every routed locale.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    by_locale: HashMap<Locale, Arc<Messages>>,
}

impl Catalogs {
    /// Load the bundled catalogs for all routed locales.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled catalog is malformed.
    pub fn load() -> Result<Self, serde_json::Error> {
        let by_locale = Locale::ALL
            .iter()
            .map(|&locale| Ok((locale, Arc::new(Messages::for_locale(locale)?))))
            .collect::<Result<_, serde_json::Error>>()?;
        Ok(Self { by_locale })
    }

    /// Messages for `locale`; an empty catalog if none is loaded.
    #[must_use]
    pub fn get(&self, locale: Locale) -> Arc<Messages> {
        self.by_locale.get(&locale).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalogs_parse() {
        let catalogs = Catalogs::load().unwrap();
        let messages = catalogs.get(Locale::EnGb);
        assert_eq!(messages.t("common.close"), "Close");
    }

    #[test]
    fn test_interpolation() {
        let messages = Messages::for_locale(Locale::EnGb).unwrap();
        assert_eq!(
            messages.t_with("errors.DISCOUNT_CODE_NOT_EXIST_ERROR", &[("code", "(SAVE10)")]),
            "The discount code (SAVE10) does not exist."
        );
    }

    #[test]
    fn test_missing_key_renders_key() {
        let messages = Messages::from_json(r#"{"cart":{}}"#).unwrap();
        assert_eq!(messages.t("cart.redeem"), "cart.redeem");
        assert_eq!(messages.t("cart"), "cart");
    }

    #[test]
    fn test_unused_placeholder_left_intact() {
        let messages = Messages::from_json(r#"{"greeting":"Hello {name}"}"#).unwrap();
        assert_eq!(messages.t("greeting"), "Hello {name}");
    }
}
