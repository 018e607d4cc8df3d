//! Product endpoints and the [`ProductGateway`] seam.

use async_trait::async_trait;
use stockroom_core::{Product, ProductChanges, ProductDraft};
use tracing::instrument;
use url::Url;

use super::{ApiClient, CategoryInfo, GatewayError, ListQuery, Page, ProductsResponse, RemotePage};

/// Remote source of products.
///
/// [`ApiClient`] is the production implementation; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    /// List products matching `query`.
    async fn list(&self, query: &ListQuery) -> Result<RemotePage, GatewayError>;

    /// Fetch one product.
    async fn get(&self, id: u64) -> Result<Product, GatewayError>;

    /// Create a product. The echoed record is not persisted upstream.
    async fn create(&self, draft: &ProductDraft) -> Result<Product, GatewayError>;

    /// Update a product. The echoed record is not persisted upstream.
    async fn update(&self, id: u64, changes: &ProductChanges) -> Result<Product, GatewayError>;

    /// Delete a product. Nothing is removed upstream.
    async fn remove(&self, id: u64) -> Result<(), GatewayError>;

    /// List the categories the API knows about.
    async fn categories(&self) -> Result<Vec<CategoryInfo>, GatewayError>;
}

/// Build the URL of a product listing.
///
/// Search wins over category: with search text the category and sort are
/// dropped because the search endpoint ignores them.
///
/// # Errors
///
/// Returns [`GatewayError::Url`] if `base` cannot carry a path.
pub fn build_list_url(base: &Url, query: &ListQuery) -> Result<Url, GatewayError> {
    let search = query.search_text();
    let mut segments = vec!["products"];
    match (search, &query.category) {
        (Some(_), _) => segments.push("search"),
        (None, Some(category)) => {
            segments.push("category");
            segments.push(category.as_str());
        }
        (None, None) => {}
    }
    let mut url = super::endpoint(base, &segments)?;

    {
        let mut pairs = url.query_pairs_mut();
        if let Some(q) = search {
            pairs.append_pair("q", q);
        }
        match query.page {
            Page::Window { offset, limit } => {
                pairs
                    .append_pair("limit", &limit.max(1).to_string())
                    .append_pair("skip", &offset.to_string());
            }
            Page::All => {
                pairs.append_pair("limit", "0");
            }
        }
        if search.is_none() {
            pairs
                .append_pair("sortBy", query.sort.as_str())
                .append_pair("order", query.order.as_str());
        }
    }

    Ok(url)
}

#[async_trait]
impl ProductGateway for ApiClient {
    #[instrument(skip(self))]
    async fn list(&self, query: &ListQuery) -> Result<RemotePage, GatewayError> {
        let url = build_list_url(self.base_url(), query)?;
        let response: ProductsResponse = self.get_json(url).await?;
        Ok(response.into())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: u64) -> Result<Product, GatewayError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        self.get_json(url).await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create(&self, draft: &ProductDraft) -> Result<Product, GatewayError> {
        let url = self.endpoint(&["products", "add"])?;
        self.post_json(url, draft).await
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: u64, changes: &ProductChanges) -> Result<Product, GatewayError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        self.put_json(url, changes).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: u64) -> Result<(), GatewayError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        self.delete(url).await
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<CategoryInfo>, GatewayError> {
        let url = self.endpoint(&["products", "categories"])?;
        self.get_json(url).await
    }
}
