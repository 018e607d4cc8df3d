//! Field-level validation of user input.
//!
//! Validation runs before any network call. Every failing field is reported
//! so a form can show all messages inline at once.

use core::fmt;

use rust_decimal::Decimal;

use crate::{ProductChanges, ProductDraft};

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name (camelCase, as on the wire).
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// All failing fields of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failing field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failing fields in the order they were checked.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a product draft.
///
/// # Errors
///
/// Returns every failing field: missing title or description, non-positive
/// price, missing category, negative stock, discount outside 0-100, rating
/// outside 0-5. Any non-empty category slug is accepted; the API owns the
/// list of categories.
pub fn validate_draft(draft: &ProductDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_required(&mut errors, "title", &draft.title, "Title is required");
    check_required(
        &mut errors,
        "description",
        &draft.description,
        "Description is required",
    );
    check_price(&mut errors, draft.price);
    check_required(&mut errors, "category", &draft.category, "Category is required");
    check_stock(&mut errors, draft.stock);
    check_range(&mut errors, "discountPercentage", draft.discount_percentage, 100.0);
    check_range(&mut errors, "rating", draft.rating, 5.0);

    errors.into_result()
}

/// Validate a partial update. Only fields that are present are checked.
///
/// # Errors
///
/// Returns every failing field, or a single `changes` error when nothing
/// would change.
pub fn validate_changes(changes: &ProductChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if changes.is_empty() {
        errors.push("changes", "At least one field must change");
        return Err(errors);
    }
    if let Some(title) = &changes.title {
        check_required(&mut errors, "title", title, "Title is required");
    }
    if let Some(description) = &changes.description {
        check_required(
            &mut errors,
            "description",
            description,
            "Description is required",
        );
    }
    if let Some(price) = changes.price {
        check_price(&mut errors, price);
    }
    if let Some(category) = &changes.category {
        check_required(&mut errors, "category", category, "Category is required");
    }
    if let Some(stock) = changes.stock {
        check_stock(&mut errors, stock);
    }
    check_range(&mut errors, "discountPercentage", changes.discount_percentage, 100.0);
    check_range(&mut errors, "rating", changes.rating, 5.0);

    errors.into_result()
}

fn check_required(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

fn check_price(errors: &mut ValidationErrors, price: Decimal) {
    if price <= Decimal::ZERO {
        errors.push("price", "Price must be a positive number");
    }
}

fn check_stock(errors: &mut ValidationErrors, stock: i64) {
    if stock < 0 {
        errors.push("stock", "Stock must be zero or more");
    }
}

fn check_range(errors: &mut ValidationErrors, field: &'static str, value: Option<f64>, max: f64) {
    if let Some(value) = value {
        if !value.is_finite() || !(0.0..=max).contains(&value) {
            errors.push(field, format!("Must be between 0 and {max}"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            title: "Widget".to_owned(),
            description: "A useful widget".to_owned(),
            price: Decimal::new(999, 2),
            category: "kitchen-accessories".to_owned(),
            stock: 5,
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert_eq!(validate_draft(&valid_draft()), Ok(()));
    }

    #[test]
    fn test_draft_reports_every_field() {
        let draft = ProductDraft {
            title: "  ".to_owned(),
            description: String::new(),
            price: Decimal::ZERO,
            category: " ".to_owned(),
            stock: -1,
            discount_percentage: Some(150.0),
            rating: Some(5.5),
            ..ProductDraft::default()
        };
        let errors = validate_draft(&draft).unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "title",
                "description",
                "price",
                "category",
                "stock",
                "discountPercentage",
                "rating"
            ]
        );
        assert_eq!(errors.message_for("category"), Some("Category is required"));
    }

    #[test]
    fn test_category_outside_catalog_is_accepted() {
        let draft = ProductDraft {
            category: "tools".to_owned(),
            ..valid_draft()
        };
        assert_eq!(validate_draft(&draft), Ok(()));

        let changes = ProductChanges {
            category: Some("garden-tools".to_owned()),
            ..ProductChanges::default()
        };
        assert_eq!(validate_changes(&changes), Ok(()));

        let changes = ProductChanges {
            category: Some(String::new()),
            ..ProductChanges::default()
        };
        let errors = validate_changes(&changes).unwrap_err();
        assert_eq!(errors.message_for("category"), Some("Category is required"));
    }

    #[test]
    fn test_missing_category_message() {
        let draft = ProductDraft {
            category: String::new(),
            ..valid_draft()
        };
        let errors = validate_draft(&draft).unwrap_err();
        assert_eq!(errors.message_for("category"), Some("Category is required"));
    }

    #[test]
    fn test_changes_checks_only_present_fields() {
        let changes = ProductChanges {
            title: Some("Updated".to_owned()),
            ..ProductChanges::default()
        };
        assert_eq!(validate_changes(&changes), Ok(()));

        let changes = ProductChanges {
            price: Some(Decimal::new(-1, 0)),
            ..ProductChanges::default()
        };
        let errors = validate_changes(&changes).unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert!(errors.to_string().starts_with("price:"));
    }

    #[test]
    fn test_empty_changes_rejected() {
        let errors = validate_changes(&ProductChanges::default()).unwrap_err();
        assert!(errors.message_for("changes").is_some());
    }
}
