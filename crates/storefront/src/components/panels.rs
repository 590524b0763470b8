//! Promo code panels kept between requests.
//!
//! A visitor's panel outlives the request that changed it so its pending
//! input clear can still fire. Panels idle for [`PANEL_IDLE`] are evicted,
//! which drops them and cancels anything still pending.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use tillpoint_core::{Checkout, CheckoutId, Locale};

use super::DiscountCode;
use crate::i18n::Messages;
use crate::services::CheckoutService;

/// How long an untouched panel is kept.
pub const PANEL_IDLE: Duration = Duration::from_secs(30 * 60);

/// A panel shared by the requests of one visitor.
pub type SharedPanel = Arc<Mutex<DiscountCode>>;

/// Promo code panels keyed by checkout and locale.
#[derive(Clone)]
pub struct DiscountPanels {
    cache: Cache<(CheckoutId, Locale), SharedPanel>,
}

impl DiscountPanels {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(PANEL_IDLE)
            .build();
        Self { cache }
    }

    /// The panel for `checkout`, created on first use and synced to its codes.
    pub async fn get(
        &self,
        checkout: &Checkout,
        locale: Locale,
        checkouts: &Arc<dyn CheckoutService>,
        messages: Arc<Messages>,
    ) -> SharedPanel {
        let panel = self
            .cache
            .get_with((checkout.id.clone(), locale), async {
                Arc::new(Mutex::new(DiscountCode::new(
                    checkout,
                    Arc::clone(checkouts),
                    messages,
                )))
            })
            .await;

        panel.lock().await.sync(checkout);
        panel
    }
}

impl Default for DiscountPanels {
    fn default() -> Self {
        Self::new()
    }
}
