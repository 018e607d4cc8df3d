//! Product records and the inputs used to create or edit them.
//!
//! The JSON shape is camelCase to match the upstream catalog API, which is
//! also the shape written to local persisted storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, Price, ProductId, Source};

/// Image shown for products that have no thumbnail of their own.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/400x300?text=Product+Image";

const MAX_DISCOUNT: f64 = 100.0;
const MAX_RATING: f64 = 5.0;

/// A product in the merged catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Set on local copies of remote products that were edited here.
    #[serde(default, rename = "isEditedFromApi", skip_serializing_if = "is_false")]
    pub edited_from_api: bool,
    /// Remote identifier of the product this record was forked from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_api_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl Product {
    /// Build a product from a draft, coercing numbers into range.
    ///
    /// Callers validate the draft first; this only clamps.
    #[must_use]
    pub fn from_draft(id: ProductId, draft: &ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: Price::clamped(draft.price),
            category: Category::lenient(&draft.category),
            stock: clamp_stock(draft.stock),
            brand: draft.brand.clone(),
            discount_percentage: draft.discount_percentage,
            rating: draft.rating,
            thumbnail: draft.thumbnail.clone(),
            edited_from_api: false,
            original_api_id: None,
            created_at: Some(now),
            updated_at: None,
        }
        .normalized()
    }

    /// Where this record lives, derived from its identifier.
    #[must_use]
    pub const fn source(&self) -> Source {
        if self.id.is_local() {
            Source::Local
        } else {
            Source::Api
        }
    }

    /// Thumbnail URL, falling back to [`PLACEHOLDER_THUMBNAIL`].
    #[must_use]
    pub fn thumbnail_or_placeholder(&self) -> &str {
        self.thumbnail
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(PLACEHOLDER_THUMBNAIL)
    }

    /// Copy with text trimmed and numbers coerced into their valid ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Trim text and coerce numbers into their valid ranges in place.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.brand = self
            .brand
            .take()
            .map(|brand| brand.trim().to_owned())
            .filter(|brand| !brand.is_empty());
        self.discount_percentage = clamp_optional(self.discount_percentage, MAX_DISCOUNT);
        self.rating = clamp_optional(self.rating, MAX_RATING);
    }

    /// Case-insensitive match of `needle` against title or description.
    ///
    /// An empty needle matches everything.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

fn clamp_stock(stock: i64) -> u32 {
    u32::try_from(stock.max(0)).unwrap_or(u32::MAX)
}

fn clamp_optional(value: Option<f64>, max: f64) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, max))
}

/// Input for creating a product, as entered on the product form.
///
/// Numbers are kept raw so validation can report every bad field at once.
/// The same shape is sent as the body of the upstream create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Partial update of a product; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ProductChanges {
    /// Whether no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge these changes into `product`, stamping `updated_at`.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = Price::clamped(price);
        }
        if let Some(category) = &self.category {
            product.category = Category::lenient(category);
        }
        if let Some(stock) = self.stock {
            product.stock = clamp_stock(stock);
        }
        if let Some(brand) = &self.brand {
            product.brand = Some(brand.clone());
        }
        if let Some(discount) = self.discount_percentage {
            product.discount_percentage = Some(discount);
        }
        if let Some(rating) = self.rating {
            product.rating = Some(rating);
        }
        if let Some(thumbnail) = &self.thumbnail {
            product.thumbnail = Some(thumbnail.clone());
        }
        product.updated_at = Some(now);
        product.normalize();
    }
}
