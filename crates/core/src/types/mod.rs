//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for catalog domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod sort;
pub mod source;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{PLACEHOLDER_THUMBNAIL, Product, ProductChanges, ProductDraft};
pub use sort::{SortField, SortOrder, SortParseError};
pub use source::Source;
