//! Server-side state for interactive checkout widgets.

pub mod discount_code;
pub mod panels;

pub use discount_code::{AppliedCode, DiscountCode, DiscountCodeView, Toast, ToastVariant};
pub use panels::{DiscountPanels, SharedPanel};
