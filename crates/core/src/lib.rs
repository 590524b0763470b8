//! Tillpoint Core - Shared checkout domain types.
//!
//! This crate provides the domain types used across the Tillpoint workspace:
//! - `storefront` - Checkout actions and HTTP surface over the commerce API
//! - `integration-tests` - Router-level tests with in-memory commerce fakes
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Every value here is a snapshot handed back by the commerce API; nothing is
//! computed locally.
//!
//! # Modules
//!
//! - [`types`] - Money, typed IDs, checkout aggregate, addresses, error codes, regions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
