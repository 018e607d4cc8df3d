//! Merged, filtered, sorted and paginated catalog views.

use std::cmp::Ordering;
use std::collections::HashSet;

use stockroom_core::{Product, ProductId, SortField, SortOrder};

use crate::api::{ListQuery, Page};

/// One page of the merged catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    /// Matching products across all pages.
    pub total: usize,
    pub offset: usize,
    /// Page size; `None` when every match is on this page.
    pub limit: Option<usize>,
    /// How many matching products are local.
    pub local_count: usize,
}

impl CatalogPage {
    /// Whether more matches follow this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Merge local and remote products into one page.
///
/// Remote items whose id is in `deleted` are dropped. Search and category
/// filters apply identically to both sources. Local items come first, then
/// a stable sort orders the whole set before paging. An id seen twice keeps
/// its first occurrence.
pub(crate) fn merge(
    remote: &[Product],
    deleted: &HashSet<u64>,
    local: &[Product],
    query: &ListQuery,
) -> CatalogPage {
    let search = query.search_text();
    let matches = |p: &&Product| {
        search.is_none_or(|needle| p.matches_search(needle))
            && query.category.as_ref().is_none_or(|c| &p.category == c)
    };

    let mut seen: HashSet<&ProductId> = HashSet::new();
    let local_matches: Vec<&Product> = local.iter().filter(matches).collect();
    let local_count = local_matches.len();
    let mut merged: Vec<Product> = local_matches
        .into_iter()
        .chain(
            remote
                .iter()
                .filter(|p| p.id.as_remote().is_none_or(|id| !deleted.contains(&id)))
                .filter(matches),
        )
        .filter(|p| seen.insert(&p.id))
        .cloned()
        .collect();

    sort_products(&mut merged, query.sort, query.order);

    let total = merged.len();
    let (offset, limit) = match query.page {
        Page::Window { offset, limit } => (offset, Some(limit.max(1))),
        Page::All => (0, None),
    };
    let items = merged
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    CatalogPage {
        items,
        total,
        offset,
        limit,
        local_count,
    }
}

/// Stable sort by `field`. Titles compare case-insensitively and a missing
/// rating counts as zero.
pub fn sort_products(products: &mut [Product], field: SortField, order: SortOrder) {
    products.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Rating => a.rating.unwrap_or(0.0).total_cmp(&b.rating.unwrap_or(0.0)),
        SortField::Stock => a.stock.cmp(&b.stock),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;
    use stockroom_core::{Category, LocalId};

    use super::*;

    fn product(id: ProductId, title: &str, price: f64, category: &str) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "description": format!("{title} description"),
            "price": price,
            "category": category,
            "stock": 1
        }))
        .unwrap()
    }

    fn remote(id: u64, title: &str, price: f64) -> Product {
        product(ProductId::Remote(id), title, price, "beauty")
    }

    fn local(n: i64, title: &str, price: f64) -> Product {
        product(ProductId::Local(LocalId::from_parts(n, "abcdefghi")), title, price, "groceries")
    }

    fn titles(page: &CatalogPage) -> Vec<&str> {
        page.items.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_title_sort_is_case_insensitive() {
        let page = merge(
            &[remote(1, "banana", 1.0), remote(2, "Apple", 2.0)],
            &HashSet::new(),
            &[local(1, "cherry", 3.0)],
            &ListQuery::default(),
        );
        assert_eq!(titles(&page), ["Apple", "banana", "cherry"]);
        assert_eq!(page.local_count, 1);
    }

    #[test]
    fn test_price_ascending_is_non_decreasing() {
        let query = ListQuery {
            sort: SortField::Price,
            page: Page::All,
            ..ListQuery::default()
        };
        let page = merge(
            &[remote(1, "a", 30.0), remote(2, "b", 5.5), remote(3, "c", 12.0)],
            &HashSet::new(),
            &[local(1, "d", 7.25), local(2, "e", 0.5)],
            &query,
        );
        assert!(page.items.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(page.limit, None);
    }

    #[test]
    fn test_search_applies_to_both_sources() {
        let query = ListQuery {
            search: Some("WIDGET".to_owned()),
            ..ListQuery::default()
        };
        let page = merge(
            &[remote(1, "Blue widget", 1.0), remote(2, "Lamp", 1.0)],
            &HashSet::new(),
            &[local(1, "widget pro", 1.0), local(2, "Other", 1.0)],
            &query,
        );
        assert_eq!(titles(&page), ["Blue widget", "widget pro"]);
    }

    #[test]
    fn test_category_filter_and_deleted_ids() {
        let query = ListQuery {
            category: Some(Category::parse("beauty").unwrap()),
            ..ListQuery::default()
        };
        let deleted = HashSet::from([2]);
        let page = merge(
            &[remote(1, "a", 1.0), remote(2, "b", 1.0)],
            &deleted,
            &[local(1, "c", 1.0)],
            &query,
        );
        assert_eq!(titles(&page), ["a"]);
        assert_eq!(page.local_count, 0);
    }

    #[test]
    fn test_pagination_window() {
        let items: Vec<_> = (1..=25).map(|i| remote(i, &format!("item {i:02}"), 1.0)).collect();
        let query = ListQuery {
            page: Page::Window {
                offset: 20,
                limit: 10,
            },
            ..ListQuery::default()
        };
        let page = merge(&items, &HashSet::new(), &[], &query);
        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].title, "item 21");
        assert!(!page.has_more());
    }

    #[test]
    fn test_zero_limit_window_yields_one_item() {
        let items: Vec<_> = (1..=3).map(|i| remote(i, &format!("item {i}"), 1.0)).collect();
        let query = ListQuery {
            page: Page::Window {
                offset: 0,
                limit: 0,
            },
            ..ListQuery::default()
        };
        let page = merge(&items, &HashSet::new(), &[], &query);
        assert_eq!(page.limit, Some(1));
        assert_eq!(titles(&page), ["item 1"]);
    }

    #[test]
    fn test_ids_are_unique() {
        let page = merge(
            &[remote(1, "a", 1.0), remote(1, "a again", 1.0)],
            &HashSet::new(),
            &[],
            &ListQuery::default(),
        );
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_missing_rating_sorts_as_zero() {
        let mut rated = remote(1, "rated", 1.0);
        rated.rating = Some(0.5);
        let unrated = remote(2, "unrated", 1.0);
        let mut items = vec![rated, unrated];
        sort_products(&mut items, SortField::Rating, SortOrder::Asc);
        assert_eq!(items[0].title, "unrated");
        sort_products(&mut items, SortField::Rating, SortOrder::Desc);
        assert_eq!(items[0].title, "rated");
    }
}
