//! Promo code panel of the shopping bag.
//!
//! Holds the form state behind the panel: which codes are applied, whether the
//! panel is open, the code input and its error, and the toasts raised along the
//! way. Submitting and removing go through the promo code actions; the result
//! is folded back into the state.
//!
//! After a field error the input clears itself after [`CLEAR_INPUT_DELAY`].
//! Only one clear is pending at a time: a newer error cycle replaces it and
//! dropping the panel cancels it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use tillpoint_core::{
    AppErr, AppResult, Checkout, CheckoutId, ErrorCode, GiftCardId, PromoCodeRef,
    PromoCodeResult,
};

use crate::actions::promo_code::{add_promo_code, remove_promo_code};
use crate::i18n::Messages;
use crate::services::CheckoutService;

/// How long a field error stays before the input is cleared.
pub const CLEAR_INPUT_DELAY: Duration = Duration::from_secs(3);

/// Field errors for these codes, first match wins.
const FIELD_ERRORS: &[(ErrorCode, &str)] = &[
    (ErrorCode::InvalidValue, "errors.DISCOUNT_CODE_NOT_EXIST_ERROR"),
    (ErrorCode::DiscountCodeAdd, "errors.DISCOUNT_CODE_ADD_ERROR"),
    (
        ErrorCode::VoucherNotApplicable,
        "errors.VOUCHER_NOT_APPLICABLE_ERROR",
    ),
];

/// A code shown as applied. Gift cards carry their ID; vouchers do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCode {
    pub display_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GiftCardId>,
}

impl AppliedCode {
    /// Gift cards are removed by ID, vouchers by their code.
    #[must_use]
    pub fn promo_code_ref(&self) -> PromoCodeRef {
        match &self.id {
            Some(id) => PromoCodeRef::Id(id.to_string()),
            None => PromoCodeRef::Code(self.display_code.clone()),
        }
    }
}

/// Codes applied to a checkout: its voucher, then each gift card.
///
/// Gift cards without a display code fall back to their last four characters;
/// codes that end up blank are dropped.
#[must_use]
pub fn applied_codes(checkout: &Checkout) -> Vec<AppliedCode> {
    let voucher = checkout.voucher_code.iter().map(|code| AppliedCode {
        display_code: code.clone(),
        id: None,
    });
    let gift_cards = checkout.used_gift_cards.iter().map(|card| AppliedCode {
        display_code: if card.display_code.is_empty() {
            card.last4_code_chars.clone()
        } else {
            card.display_code.clone()
        },
        id: Some(card.id.clone()),
    });

    voucher
        .chain(gift_cards)
        .filter(|code| !code.display_code.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub description: String,
    pub variant: ToastVariant,
}

/// Snapshot of the panel for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCodeView {
    pub label: String,
    pub applied_codes: Vec<AppliedCode>,
    pub is_open: bool,
    pub is_transitioning: bool,
    pub should_clear_input: bool,
    pub code: String,
    pub code_error: Option<String>,
    pub toasts: Vec<Toast>,
}

#[derive(Debug, Default)]
struct FormState {
    applied_codes: Vec<AppliedCode>,
    is_open: bool,
    is_transitioning: bool,
    should_clear_input: bool,
    code: String,
    code_error: Option<String>,
    toasts: Vec<Toast>,
}

impl FormState {
    fn reset_input(&mut self) {
        self.code.clear();
        self.code_error = None;
    }
}

/// Promo code panel for one checkout.
pub struct DiscountCode {
    checkout_id: CheckoutId,
    checkouts: Arc<dyn CheckoutService>,
    messages: Arc<Messages>,
    state: Arc<Mutex<FormState>>,
    clear_timer: Option<JoinHandle<()>>,
}

impl DiscountCode {
    #[must_use]
    pub fn new(
        checkout: &Checkout,
        checkouts: Arc<dyn CheckoutService>,
        messages: Arc<Messages>,
    ) -> Self {
        Self {
            checkout_id: checkout.id.clone(),
            checkouts,
            messages,
            state: Arc::new(Mutex::new(FormState {
                applied_codes: applied_codes(checkout),
                ..FormState::default()
            })),
            clear_timer: None,
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_open(&self, open: bool) {
        self.state().is_open = open;
    }

    /// Take the applied codes from a freshly loaded checkout.
    pub fn sync(&self, checkout: &Checkout) {
        self.state().applied_codes = applied_codes(checkout);
    }

    pub fn set_code(&self, code: impl Into<String>) {
        self.state().code = code.into();
    }

    /// Label of the panel, counting applied codes unless an update is in flight.
    #[must_use]
    pub fn label(&self) -> String {
        let state = self.state();
        self.label_for(&state)
    }

    fn label_for(&self, state: &FormState) -> String {
        let count = if !state.is_transitioning && !state.applied_codes.is_empty() {
            format!("({})", state.applied_codes.len())
        } else {
            String::new()
        };
        self.messages
            .t_with("cart.discount-code", &[("code", &count)])
            .trim_end()
            .to_string()
    }

    #[must_use]
    pub fn view(&self) -> DiscountCodeView {
        let state = self.state();
        DiscountCodeView {
            label: self.label_for(&state),
            applied_codes: state.applied_codes.clone(),
            is_open: state.is_open,
            is_transitioning: state.is_transitioning,
            should_clear_input: state.should_clear_input,
            code: state.code.clone(),
            code_error: state.code_error.clone(),
            toasts: state.toasts.clone(),
        }
    }

    /// Apply the code in the input.
    ///
    /// A blank input fails validation without calling the API.
    pub async fn submit(&mut self) -> AppResult<PromoCodeResult> {
        let code = self.state().code.trim().to_string();
        if code.is_empty() {
            self.state().code_error = Some(self.messages.t("form-validation.typeTheDiscount"));
            return Err(vec![AppErr::new(ErrorCode::Required).with_field("code")]);
        }

        {
            let mut state = self.state();
            state.toasts.clear();
            state.is_transitioning = true;
        }
        let result = add_promo_code(self.checkouts.as_ref(), &self.checkout_id, &code).await;

        let field_error = {
            let mut state = self.state();
            state.is_transitioning = false;
            match &result {
                Ok(_) => {
                    state.reset_input();
                    state.is_open = false;
                    false
                }
                Err(errors) => self.apply_add_errors(&mut state, errors, &code),
            }
        };
        if field_error {
            self.schedule_clear_input();
        }

        result
    }

    /// Set the field error for the first recognized code, or raise a toast.
    ///
    /// Returns whether a field error was set.
    fn apply_add_errors(&self, state: &mut FormState, errors: &[AppErr], code: &str) -> bool {
        let submitted = format!("({code})");
        let key = FIELD_ERRORS.iter().find_map(|(wanted, key)| {
            errors.iter().any(|e| e.code == *wanted).then_some(*key)
        });

        if let Some(key) = key {
            state.code_error = Some(self.messages.t_with(key, &[("code", &submitted)]));
            state.should_clear_input = true;
            true
        } else {
            state.toasts.push(Toast {
                description: self.messages.t("errors.UNKNOWN_ERROR"),
                variant: ToastVariant::Destructive,
            });
            false
        }
    }

    fn schedule_clear_input(&mut self) {
        if let Some(pending) = self.clear_timer.take() {
            pending.abort();
        }

        let state = Arc::clone(&self.state);
        self.clear_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(CLEAR_INPUT_DELAY).await;
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.reset_input();
            state.should_clear_input = false;
        }));
    }

    /// Remove an applied code.
    pub async fn remove(&mut self, code: &AppliedCode) -> AppResult<PromoCodeResult> {
        {
            let mut state = self.state();
            state.toasts.clear();
            state.is_transitioning = true;
        }
        let result = remove_promo_code(
            self.checkouts.as_ref(),
            &self.checkout_id,
            &code.promo_code_ref(),
        )
        .await;

        let mut state = self.state();
        state.is_transitioning = false;
        match &result {
            Ok(_) => {
                state.applied_codes.retain(|applied| applied != code);
                state.toasts.push(Toast {
                    description: self.messages.t("cart.discount-removed"),
                    variant: ToastVariant::Default,
                });
                state.reset_input();
            }
            Err(_) => state.toasts.push(Toast {
                description: self.messages.t("errors.DISCOUNT_CODE_REMOVE_ERROR"),
                variant: ToastVariant::Destructive,
            }),
        }
        drop(state);

        result
    }
}

impl Drop for DiscountCode {
    fn drop(&mut self) {
        if let Some(pending) = self.clear_timer.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Call, CallLog, FakeCheckoutService, checkout, err, gift_card};

    fn messages() -> Arc<Messages> {
        Arc::new(Messages::for_locale(tillpoint_core::Locale::EnGb).unwrap())
    }

    fn panel(service: FakeCheckoutService) -> DiscountCode {
        DiscountCode::new(&checkout(), Arc::new(service), messages())
    }

    #[test]
    fn test_applied_codes_from_checkout() {
        let mut checkout = checkout();
        let mut unnamed = gift_card("gc_2", "");
        unnamed.last4_code_chars = "7Q1Z".to_string();
        let mut blank = gift_card("gc_3", "");
        blank.last4_code_chars = String::new();
        checkout.used_gift_cards.extend([unnamed, blank]);

        let codes = applied_codes(&checkout);

        assert_eq!(
            codes,
            vec![
                AppliedCode {
                    display_code: "SAVE10".to_string(),
                    id: None
                },
                AppliedCode {
                    display_code: "GIFT-9F2A".to_string(),
                    id: Some(GiftCardId::new("gc_1"))
                },
                AppliedCode {
                    display_code: "7Q1Z".to_string(),
                    id: Some(GiftCardId::new("gc_2"))
                },
            ]
        );
    }

    #[test]
    fn test_label_counts_applied_codes() {
        let discount = panel(FakeCheckoutService::new(CallLog::default()));
        assert_eq!(discount.label(), "Discount code (2)");

        discount.state().is_transitioning = true;
        assert_eq!(discount.label(), "Discount code");
    }

    #[test]
    fn test_label_without_codes() {
        let mut checkout = checkout();
        checkout.voucher_code = None;
        checkout.used_gift_cards.clear();
        let discount = DiscountCode::new(
            &checkout,
            Arc::new(FakeCheckoutService::new(CallLog::default())),
            messages(),
        );
        assert_eq!(discount.label(), "Discount code");
    }

    #[tokio::test]
    async fn test_blank_code_fails_validation() {
        let log = CallLog::default();
        let mut discount = panel(FakeCheckoutService::new(log.clone()));
        discount.set_code("   ");

        let errors = discount.submit().await.unwrap_err();

        assert_eq!(errors[0].code, ErrorCode::Required);
        assert_eq!(
            discount.view().code_error.as_deref(),
            Some("Type the discount code")
        );
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_success_resets_and_closes() {
        let log = CallLog::default();
        let mut discount = panel(FakeCheckoutService::new(log.clone()));
        discount.set_open(true);
        discount.set_code(" SAVE10 ");

        discount.submit().await.unwrap();

        let view = discount.view();
        assert!(!view.is_open);
        assert!(!view.is_transitioning);
        assert_eq!(view.code, "");
        assert_eq!(view.code_error, None);
        assert_eq!(log.calls(), vec![Call::AddPromoCode("SAVE10".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_code_shows_error_then_clears() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.add_promo_code = err(ErrorCode::InvalidValue);
        let mut discount = panel(service);
        discount.set_code("SAVE10");

        discount.submit().await.unwrap_err();

        let view = discount.view();
        assert_eq!(
            view.code_error.as_deref(),
            Some("The discount code (SAVE10) does not exist.")
        );
        assert!(view.should_clear_input);
        assert_eq!(view.code, "SAVE10");

        tokio::time::sleep(CLEAR_INPUT_DELAY - Duration::from_millis(100)).await;
        assert_eq!(discount.view().code, "SAVE10");

        tokio::time::sleep(Duration::from_millis(200)).await;
        let view = discount.view();
        assert_eq!(view.code, "");
        assert_eq!(view.code_error, None);
        assert!(!view.should_clear_input);
    }

    #[tokio::test]
    async fn test_error_priority() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.add_promo_code = Err(vec![
            AppErr::new(ErrorCode::VoucherNotApplicable),
            AppErr::new(ErrorCode::DiscountCodeAdd),
        ]);
        let mut discount = panel(service);
        discount.set_code("SAVE10");

        discount.submit().await.unwrap_err();

        assert_eq!(
            discount.view().code_error.as_deref(),
            Some("We couldn't apply the discount code (SAVE10).")
        );
    }

    #[tokio::test]
    async fn test_unrecognized_error_raises_toast() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.add_promo_code = err(ErrorCode::Http);
        let mut discount = panel(service);
        discount.set_code("SAVE10");

        discount.submit().await.unwrap_err();

        let view = discount.view();
        assert_eq!(view.code_error, None);
        assert!(!view.should_clear_input);
        assert_eq!(
            view.toasts,
            vec![Toast {
                description: "Something went wrong. Please try again.".to_string(),
                variant: ToastVariant::Destructive,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_error_restarts_clear_timer() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.add_promo_code = err(ErrorCode::InvalidValue);
        let mut discount = panel(service);

        discount.set_code("FIRST");
        discount.submit().await.unwrap_err();
        tokio::time::sleep(Duration::from_secs(2)).await;

        discount.set_code("SECOND");
        discount.submit().await.unwrap_err();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // The first timer would have fired by now
        assert_eq!(discount.view().code, "SECOND");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(discount.view().code, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_clear() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.add_promo_code = err(ErrorCode::InvalidValue);
        let mut discount = panel(service);
        discount.set_code("SAVE10");
        discount.submit().await.unwrap_err();

        let state = Arc::clone(&discount.state);
        drop(discount);
        tokio::time::sleep(CLEAR_INPUT_DELAY * 2).await;

        assert_eq!(state.lock().unwrap().code, "SAVE10");
    }

    #[test]
    fn test_sync_replaces_applied_codes() {
        let discount = panel(FakeCheckoutService::new(CallLog::default()));
        let mut refreshed = checkout();
        refreshed.used_gift_cards.clear();

        discount.sync(&refreshed);

        assert_eq!(discount.label(), "Discount code (1)");
        assert_eq!(
            discount.view().applied_codes,
            vec![AppliedCode {
                display_code: "SAVE10".to_string(),
                id: None
            }]
        );
    }

    #[tokio::test]
    async fn test_toasts_only_cover_latest_action() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.add_promo_code = err(ErrorCode::Http);
        let mut discount = panel(service);
        discount.set_code("SAVE10");
        discount.submit().await.unwrap_err();
        discount.set_code("SAVE10");
        discount.submit().await.unwrap_err();

        assert_eq!(discount.view().toasts.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_gift_card_by_id() {
        let log = CallLog::default();
        let mut discount = panel(FakeCheckoutService::new(log.clone()));
        discount.set_code("typed");
        let gift_card = AppliedCode {
            display_code: "GIFT-9F2A".to_string(),
            id: Some(GiftCardId::new("gc_1")),
        };

        discount.remove(&gift_card).await.unwrap();

        let view = discount.view();
        assert_eq!(
            view.toasts,
            vec![Toast {
                description: "Discount code removed".to_string(),
                variant: ToastVariant::Default,
            }]
        );
        assert_eq!(view.code, "");
        assert_eq!(view.applied_codes.len(), 1);
        assert_eq!(
            log.calls(),
            vec![Call::RemovePromoCode(PromoCodeRef::Id("gc_1".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_remove_voucher_by_code() {
        let log = CallLog::default();
        let mut discount = panel(FakeCheckoutService::new(log.clone()));
        let voucher = AppliedCode {
            display_code: "SAVE10".to_string(),
            id: None,
        };

        discount.remove(&voucher).await.unwrap();

        assert_eq!(
            log.calls(),
            vec![Call::RemovePromoCode(PromoCodeRef::Code(
                "SAVE10".to_string()
            ))]
        );
    }

    #[tokio::test]
    async fn test_remove_failure_raises_toast() {
        let mut service = FakeCheckoutService::new(CallLog::default());
        service.remove_promo_code = err(ErrorCode::DiscountCodeRemove);
        let mut discount = panel(service);
        discount.set_code("typed");
        let voucher = AppliedCode {
            display_code: "SAVE10".to_string(),
            id: None,
        };

        discount.remove(&voucher).await.unwrap_err();

        let view = discount.view();
        assert_eq!(view.code, "typed");
        assert_eq!(view.applied_codes.len(), 2);
        assert_eq!(
            view.toasts,
            vec![Toast {
                description: "We couldn't remove the discount code.".to_string(),
                variant: ToastVariant::Destructive,
            }]
        );
    }
}
