//! Listing filter state.
//!
//! [`ProductFilters`] holds what a browsing session has picked: category,
//! search text, sort and the 1-based page. Changing anything that alters the
//! result set sends the user back to the first page.

use stockroom_core::{Category, SortField, SortOrder};

use crate::api::{ListQuery, Page};

/// Items per page unless changed.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Filters for the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilters {
    category: Option<Category>,
    search: String,
    sort: SortField,
    order: SortOrder,
    page: usize,
    per_page: usize,
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            category: None,
            search: String::new(),
            sort: SortField::default(),
            order: SortOrder::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ProductFilters {
    /// Filters with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub const fn sort(&self) -> (SortField, SortOrder) {
        (self.sort, self.order)
    }

    /// Current page, starting at 1.
    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Set the page size. Zero is treated as one.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// Reordering keeps the current page.
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        self.sort = field;
        self.order = order;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Clear every filter. The page size is kept.
    pub fn reset(&mut self) {
        *self = Self {
            per_page: self.per_page,
            ..Self::default()
        };
    }

    /// Whether a category or search narrows the listing.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        self.category.is_some() || !self.search.trim().is_empty()
    }

    /// Number of pages needed for `total` items, at least one.
    #[must_use]
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// The listing query for the current state.
    #[must_use]
    pub fn to_query(&self) -> ListQuery {
        ListQuery {
            search: Some(self.search.trim().to_owned()).filter(|s| !s.is_empty()),
            category: self.category.clone(),
            sort: self.sort,
            order: self.order,
            page: Page::Window {
                offset: (self.page - 1).saturating_mul(self.per_page),
                limit: self.per_page,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn on_page_three() -> ProductFilters {
        let mut filters = ProductFilters::new();
        filters.set_page(3);
        filters
    }

    #[test]
    fn test_defaults() {
        let filters = ProductFilters::new();
        assert_eq!(filters.page(), 1);
        assert_eq!(filters.per_page(), 10);
        assert!(!filters.has_active_filters());
        assert_eq!(filters.to_query(), ListQuery::default());
    }

    #[test]
    fn test_narrowing_resets_page() {
        let mut filters = on_page_three();
        filters.set_category(Some(Category::parse("laptops").unwrap()));
        assert_eq!(filters.page(), 1);

        let mut filters = on_page_three();
        filters.set_search("phone");
        assert_eq!(filters.page(), 1);
        assert!(filters.has_active_filters());

        let mut filters = on_page_three();
        filters.set_per_page(25);
        assert_eq!(filters.page(), 1);
    }

    #[test]
    fn test_sort_keeps_page() {
        let mut filters = on_page_three();
        filters.set_sort(SortField::Price, SortOrder::Desc);
        assert_eq!(filters.page(), 3);
        assert_eq!(filters.sort(), (SortField::Price, SortOrder::Desc));
    }

    #[test]
    fn test_page_is_clamped() {
        let mut filters = ProductFilters::new();
        filters.set_page(0);
        assert_eq!(filters.page(), 1);
    }

    #[test]
    fn test_to_query_offset() {
        let mut filters = ProductFilters::new();
        filters.set_search("  lamp ");
        filters.set_per_page(20);
        filters.set_page(3);
        let query = filters.to_query();
        assert_eq!(query.search.as_deref(), Some("lamp"));
        assert_eq!(
            query.page,
            Page::Window {
                offset: 40,
                limit: 20
            }
        );
    }

    #[test]
    fn test_reset_keeps_page_size() {
        let mut filters = ProductFilters::new();
        filters.set_per_page(50);
        filters.set_search("x");
        filters.set_sort(SortField::Rating, SortOrder::Desc);
        filters.set_page(4);
        filters.reset();
        assert_eq!(filters.per_page(), 50);
        assert_eq!(filters.page(), 1);
        assert!(!filters.has_active_filters());
        assert_eq!(filters.sort(), (SortField::Title, SortOrder::Asc));
    }

    #[test]
    fn test_page_count() {
        let filters = ProductFilters::new();
        assert_eq!(filters.page_count(0), 1);
        assert_eq!(filters.page_count(10), 1);
        assert_eq!(filters.page_count(194), 20);
    }
}
