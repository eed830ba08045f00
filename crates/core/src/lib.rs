//! Oroshi Core - Shared domain types.
//!
//! This crate provides the common types used across the oroshi ordering
//! portal:
//! - `server` - HTTP API serving the customer and admin surfaces
//! - `integration-tests` - end-to-end scenarios
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, email, order status, quantity rules,
//!   and calendar-month arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
