//! Stockroom Core - Shared catalog types.
//!
//! This crate provides the domain types used across all Stockroom components:
//! - `admin` - Catalog client library (remote gateway, local store, reconciliation)
//! - `cli` - Command-line front-end for browsing and editing the catalog
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pure helpers - no I/O,
//! no storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, prices, categories, products and emails
//! - [`validation`] - Field-level validation of user input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, ValidationErrors};
