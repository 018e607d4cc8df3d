#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;
use stockroom_core::{Product, ProductChanges, ProductDraft, ProductId, SortField};

use super::*;
use crate::api::{CategoryInfo, GatewayError, Page, RemotePage};
use crate::config::AdminAllowList;
use crate::session::Session;
use crate::storage::MemoryStorage;

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    fail_list: bool,
    fail_writes: bool,
    calls: Vec<String>,
}

/// In-memory stand-in for the catalog API. Writes are acknowledged but,
/// like the real API, never change what later reads return.
#[derive(Clone, Default)]
struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    fn with_products(products: Vec<Product>) -> Self {
        let gateway = Self::default();
        gateway.state.lock().unwrap().products = products;
        gateway
    }

    fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_writes {
            return Err(GatewayError::Status {
                status: 503,
                message: Some("unavailable".to_owned()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProductGateway for FakeGateway {
    async fn list(&self, query: &ListQuery) -> Result<RemotePage, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list".to_owned());
        if state.fail_list {
            return Err(GatewayError::Status {
                status: 500,
                message: None,
            });
        }
        let items: Vec<Product> = state
            .products
            .iter()
            .filter(|p| query.search_text().is_none_or(|q| p.matches_search(q)))
            .filter(|p| {
                query.search_text().is_some()
                    || query.category.as_ref().is_none_or(|c| &p.category == c)
            })
            .cloned()
            .collect();
        Ok(RemotePage {
            total: items.len(),
            items,
        })
    }

    async fn get(&self, id: u64) -> Result<Product, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get {id}"));
        state
            .products
            .iter()
            .find(|p| p.id == ProductId::Remote(id))
            .cloned()
            .ok_or(GatewayError::Status {
                status: 404,
                message: Some(format!("Product with id '{id}' not found")),
            })
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, GatewayError> {
        self.record(format!("create {}", draft.title))?;
        Ok(Product::from_draft(ProductId::Remote(195), draft, Utc::now()))
    }

    async fn update(&self, id: u64, _changes: &ProductChanges) -> Result<Product, GatewayError> {
        self.record(format!("update {id}"))?;
        self.get(id).await
    }

    async fn remove(&self, id: u64) -> Result<(), GatewayError> {
        self.record(format!("remove {id}"))
    }

    async fn categories(&self) -> Result<Vec<CategoryInfo>, GatewayError> {
        Ok(vec![CategoryInfo {
            slug: "beauty".to_owned(),
            name: "Beauty".to_owned(),
            url: None,
        }])
    }
}

fn remote_product(id: u64, title: &str, price: f64, category: &str) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "description": format!("{title} from the catalog"),
        "price": price,
        "category": category,
        "stock": 10,
        "rating": 4.2
    }))
    .unwrap()
}

fn seed() -> Vec<Product> {
    vec![
        remote_product(1, "Essence Mascara", 9.99, "beauty"),
        remote_product(2, "Eyeshadow Palette", 19.99, "beauty"),
        remote_product(5, "Red Lipstick", 12.99, "beauty"),
        remote_product(6, "Calvin Klein CK One", 49.99, "fragrances"),
    ]
}

fn catalog(gateway: &FakeGateway) -> Catalog<FakeGateway, MemoryStorage> {
    Catalog::new(gateway.clone(), MemoryStorage::new())
}

fn admin() -> AdminGrant {
    let mut session = Session::restore(MemoryStorage::new(), AdminAllowList::default());
    session
        .set_credentials(
            serde_json::from_value(json!({"id": 1, "username": "emilys"})).unwrap(),
            SecretString::from("token"),
        )
        .unwrap();
    session.require_admin().unwrap()
}

fn widget() -> ProductDraft {
    ProductDraft {
        title: "Widget".to_owned(),
        description: "A useful widget".to_owned(),
        price: Decimal::new(999, 2),
        category: "kitchen-accessories".to_owned(),
        stock: 5,
        ..ProductDraft::default()
    }
}

fn everything() -> ListQuery {
    ListQuery {
        page: Page::All,
        ..ListQuery::default()
    }
}

fn retitle(title: &str) -> ProductChanges {
    ProductChanges {
        title: Some(title.to_owned()),
        ..ProductChanges::default()
    }
}

#[tokio::test]
async fn test_refresh_merges_local_first_then_sorts() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    catalog.create(admin(), &widget()).await.unwrap();

    let page = catalog.refresh(&everything()).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.local_count, 1);
    let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Calvin Klein CK One",
            "Essence Mascara",
            "Eyeshadow Palette",
            "Red Lipstick",
            "Widget"
        ]
    );
}

#[tokio::test]
async fn test_create_is_local_first_even_when_remote_fails() {
    let gateway = FakeGateway::with_products(seed());
    gateway.fail_writes(true);
    let mut catalog = catalog(&gateway);

    let created = catalog.create(admin(), &widget()).await.unwrap();
    assert!(created.id.is_local());
    assert!(created.created_at.is_some());
    assert_eq!(gateway.calls(), ["create Widget"]);

    let page = catalog.refresh(&everything()).await.unwrap();
    let locals: Vec<_> = page.items.iter().filter(|p| p.id.is_local()).collect();
    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].title, "Widget");
}

#[tokio::test]
async fn test_create_rejects_invalid_draft_before_any_call() {
    let gateway = FakeGateway::default();
    let mut catalog = catalog(&gateway);
    let draft = ProductDraft {
        title: String::new(),
        price: Decimal::ZERO,
        category: String::new(),
        ..widget()
    };

    let err = catalog.create(admin(), &draft).await.unwrap_err();
    let errors = err.validation().unwrap();
    assert!(errors.message_for("title").is_some());
    assert!(errors.message_for("price").is_some());
    assert!(errors.message_for("category").is_some());
    assert!(gateway.calls().is_empty());
    assert!(catalog.store().list().is_empty());
}

#[tokio::test]
async fn test_create_accepts_category_outside_catalog() {
    let gateway = FakeGateway::default();
    let mut catalog = catalog(&gateway);
    let draft = ProductDraft {
        title: "Widget".to_owned(),
        price: Decimal::new(999, 2),
        category: "tools".to_owned(),
        stock: 5,
        ..widget()
    };

    let created = catalog.create(admin(), &draft).await.unwrap();
    assert!(created.id.is_local());
    assert!(created.id.to_string().starts_with("local_"));
    assert_eq!(created.category.as_str(), "tools");

    let locals = catalog.store().list();
    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].id, created.id);
}

#[tokio::test]
async fn test_update_local_merges_in_place() {
    let gateway = FakeGateway::default();
    let mut catalog = catalog(&gateway);
    let created = catalog.create(admin(), &widget()).await.unwrap();

    let updated = catalog
        .update(admin(), &created.id, &retitle("Widget Pro"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Widget Pro");
    assert_eq!(updated.description, "A useful widget");
    assert!(updated.updated_at.is_some());
    assert_eq!(catalog.store().list(), vec![updated]);
    assert_eq!(gateway.calls(), ["create Widget"]);
}

#[tokio::test]
async fn test_fork_on_write_keeps_original_and_one_fork() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    catalog.refresh(&everything()).await.unwrap();

    catalog
        .update(admin(), &ProductId::Remote(5), &retitle("First edit"))
        .await
        .unwrap();
    let fork = catalog
        .update(admin(), &ProductId::Remote(5), &retitle("Updated"))
        .await
        .unwrap();
    assert!(fork.id.is_local());
    assert!(fork.edited_from_api);
    assert_eq!(fork.original_api_id, Some(5));
    assert_eq!(fork.price, seed()[2].price);

    let page = catalog.view(&everything());
    let original = page.items.iter().find(|p| p.id == ProductId::Remote(5)).unwrap();
    assert_eq!(original.title, "Red Lipstick");

    let forks: Vec<_> = page
        .items
        .iter()
        .filter(|p| p.original_api_id == Some(5))
        .collect();
    assert_eq!(forks.len(), 1);
    assert_eq!(forks[0].title, "Updated");

    let mut ids: Vec<_> = page.items.iter().map(|p| p.id.to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), page.items.len());
}

#[tokio::test]
async fn test_fork_survives_remote_update_failure() {
    let gateway = FakeGateway::with_products(seed());
    gateway.fail_writes(true);
    let mut catalog = catalog(&gateway);
    catalog.refresh(&everything()).await.unwrap();

    let fork = catalog
        .update(admin(), &ProductId::Remote(1), &retitle("Mascara XL"))
        .await
        .unwrap();
    assert_eq!(catalog.store().find(&fork.id).unwrap().title, "Mascara XL");
}

#[tokio::test]
async fn test_fork_of_uncached_product_fetches_it() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);

    let fork = catalog
        .update(admin(), &ProductId::Remote(6), &retitle("CK One 200ml"))
        .await
        .unwrap();
    assert_eq!(fork.original_api_id, Some(6));
    assert_eq!(fork.category.as_str(), "fragrances");
    assert_eq!(gateway.calls(), ["get 6", "update 6", "get 6"]);

    let err = catalog
        .update(admin(), &ProductId::Remote(404), &retitle("Nope"))
        .await
        .unwrap_err();
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_delete_local_twice() {
    let gateway = FakeGateway::default();
    let mut catalog = catalog(&gateway);
    let created = catalog.create(admin(), &widget()).await.unwrap();

    assert!(catalog.delete(admin(), &created.id).await.unwrap());
    assert!(!catalog.delete(admin(), &created.id).await.unwrap());
    assert!(catalog.store().list().is_empty());
    assert!(matches!(
        catalog.get(&created.id).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_remote_hides_row_and_removes_fork() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    catalog.refresh(&everything()).await.unwrap();
    catalog
        .update(admin(), &ProductId::Remote(5), &retitle("Updated"))
        .await
        .unwrap();

    assert!(catalog.delete(admin(), &ProductId::Remote(5)).await.unwrap());
    assert!(catalog.store().fork_of(5).is_none());

    // The API does not persist deletes, so a refresh returns the row again.
    let page = catalog.refresh(&everything()).await.unwrap();
    assert!(page.items.iter().all(|p| p.id != ProductId::Remote(5)));
    assert_eq!(page.total, 3);

    let store_before = catalog.store().list();
    assert!(!catalog.delete(admin(), &ProductId::Remote(5)).await.unwrap());
    assert_eq!(catalog.store().list(), store_before);
    assert_eq!(
        gateway.calls().iter().filter(|c| *c == "remove 5").count(),
        1
    );
}

#[tokio::test]
async fn test_delete_remote_failure_restores_position() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    catalog.refresh(&everything()).await.unwrap();
    catalog
        .update(admin(), &ProductId::Remote(2), &retitle("Palette v2"))
        .await
        .unwrap();
    let before: Vec<_> = catalog.cached().iter().map(|p| p.id.clone()).collect();

    gateway.fail_writes(true);
    let err = catalog
        .delete(admin(), &ProductId::Remote(2))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Catalog API error: API error: 503 - unavailable");

    let after: Vec<_> = catalog.cached().iter().map(|p| p.id.clone()).collect();
    assert_eq!(after, before);
    assert!(!catalog.is_deleted(2));
    // The fork was removed before the remote call and is not restored.
    assert!(catalog.store().fork_of(2).is_none());
}

#[tokio::test]
async fn test_refresh_error_surfaces_and_keeps_cache() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    catalog.refresh(&everything()).await.unwrap();

    gateway.fail_list(true);
    let err = catalog.refresh(&everything()).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(catalog.cached().len(), 4);
}

#[tokio::test]
async fn test_search_and_sort_across_sources() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    catalog
        .create(
            admin(),
            &ProductDraft {
                title: "LIPSTICK remover".to_owned(),
                price: Decimal::new(450, 2),
                ..widget()
            },
        )
        .await
        .unwrap();

    let query = ListQuery {
        search: Some("lipstick".to_owned()),
        sort: SortField::Price,
        ..ListQuery::default()
    };
    let page = catalog.refresh(&query).await.unwrap();
    let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["LIPSTICK remover", "Red Lipstick"]);
    assert!(page.items.windows(2).all(|w| w[0].price <= w[1].price));
}

#[tokio::test]
async fn test_get_dispatches_on_id_kind() {
    let gateway = FakeGateway::with_products(seed());
    let mut catalog = catalog(&gateway);
    let created = catalog.create(admin(), &widget()).await.unwrap();

    assert_eq!(catalog.get(&created.id).await.unwrap(), created);
    assert_eq!(
        catalog.get(&ProductId::Remote(1)).await.unwrap().title,
        "Essence Mascara"
    );
    assert_eq!(catalog.categories().await.unwrap()[0].slug, "beauty");
}
