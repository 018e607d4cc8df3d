//! Product categories.
//!
//! The catalog offers a fixed list of category slugs for browsing filters.
//! Product records carry any slug unchanged, whether they come back from the
//! upstream API or are authored locally, so a category outside the list never
//! blocks a create or breaks decoding of a page.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category slugs offered when creating or editing a product.
pub const CATALOG: [&str; 24] = [
    "beauty",
    "fragrances",
    "furniture",
    "groceries",
    "home-decoration",
    "kitchen-accessories",
    "laptops",
    "mens-shirts",
    "mens-shoes",
    "mens-watches",
    "mobile-accessories",
    "motorcycle",
    "skin-care",
    "smartphones",
    "sports-accessories",
    "sunglasses",
    "tablets",
    "tops",
    "vehicle",
    "womens-bags",
    "womens-dresses",
    "womens-jewellery",
    "womens-shoes",
    "womens-watches",
];

/// Errors that can occur when parsing a [`Category`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    /// No category was given.
    #[error("category is required")]
    Empty,
    /// The slug is not part of the catalog.
    #[error("unknown category: {0}")]
    Unknown(String),
}

/// A category slug such as `smartphones` or `home-decoration`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Parse a slug from the catalog (trimmed, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not in [`CATALOG`].
    pub fn parse(s: &str) -> Result<Self, CategoryError> {
        let slug = s.trim().to_ascii_lowercase();
        if slug.is_empty() {
            return Err(CategoryError::Empty);
        }
        if CATALOG.contains(&slug.as_str()) {
            Ok(Self(slug))
        } else {
            Err(CategoryError::Unknown(slug))
        }
    }

    /// Wrap a slug without checking it against the catalog.
    ///
    /// Used for product records and drafts.
    #[must_use]
    pub fn lenient(s: &str) -> Self {
        Self(s.trim().to_ascii_lowercase())
    }

    /// Every category in the catalog, in display order.
    pub fn all() -> impl Iterator<Item = Self> {
        CATALOG.iter().map(|slug| Self((*slug).to_owned()))
    }

    /// Returns the slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this slug belongs to the catalog.
    #[must_use]
    pub fn is_known(&self) -> bool {
        CATALOG.contains(&self.0.as_str())
    }

    /// Display label: the slug with its first letter uppercased.
    #[must_use]
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
