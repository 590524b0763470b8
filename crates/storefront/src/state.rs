//! Application state shared across handlers.

use std::sync::Arc;

use tillpoint_core::{Checkout, Locale};

use crate::commerce::{CommerceCheckoutService, CommerceClient, CommerceUserService};
use crate::components::{DiscountPanels, SharedPanel};
use crate::config::StorefrontConfig;
use crate::i18n::Catalogs;
use crate::services::{CheckoutService, UserService};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid message catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The commerce services sit behind trait
/// objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    checkouts: Arc<dyn CheckoutService>,
    users: Arc<dyn UserService>,
    catalogs: Catalogs,
    discount_panels: DiscountPanels,
}

impl AppState {
    /// Create the application state backed by the commerce API.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled message catalog is malformed.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let client = CommerceClient::new(&config.commerce);
        let checkouts = Arc::new(CommerceCheckoutService::new(client.clone()));
        let users = Arc::new(CommerceUserService::new(client));

        Ok(Self::from_parts(config, checkouts, users, Catalogs::load()?))
    }

    /// Assemble the state from already-built services.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        checkouts: Arc<dyn CheckoutService>,
        users: Arc<dyn UserService>,
        catalogs: Catalogs,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                checkouts,
                users,
                catalogs,
                discount_panels: DiscountPanels::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Checkout operations against the commerce API.
    #[must_use]
    pub fn checkouts(&self) -> &Arc<dyn CheckoutService> {
        &self.inner.checkouts
    }

    /// Customer account operations against the commerce API.
    #[must_use]
    pub fn users(&self) -> &dyn UserService {
        self.inner.users.as_ref()
    }

    /// The visitor's promo code panel for `checkout`.
    pub async fn discount_panel(&self, checkout: &Checkout, locale: Locale) -> SharedPanel {
        self.inner
            .discount_panels
            .get(
                checkout,
                locale,
                &self.inner.checkouts,
                self.inner.catalogs.get(locale),
            )
            .await
    }
}
