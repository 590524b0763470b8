//! Core types for Tillpoint.
//!
//! This module provides type-safe wrappers for checkout domain concepts.

pub mod address;
pub mod checkout;
pub mod error;
pub mod id;
pub mod money;
pub mod region;

pub use address::{Address, AddressFormInput, AddressType};
pub use checkout::{
    Checkout, CheckoutProblems, GiftCard, InsufficientStockProblem, Line, OrderCreated,
    PromoCodeRef, PromoCodeResult, VariantNotAvailableProblem,
};
pub use error::{AppErr, AppResult, ErrorCode};
pub use id::*;
pub use money::{Money, PriceType, TaxedMoney};
pub use region::{Language, Locale, LocaleError, Market};
