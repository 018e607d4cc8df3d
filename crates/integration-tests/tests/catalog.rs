//! Catalog reconciliation end-to-end over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use secrecy::SecretString;
use stockroom_admin::account;
use stockroom_admin::{
    AdminAllowList, ApiClient, Catalog, CatalogError, FileStorage, ListQuery, MemoryStorage, Page,
    Session,
};
use stockroom_core::{ProductChanges, ProductDraft, ProductId, SortField};
use stockroom_integration_tests::FakeApi;

struct Harness {
    api: FakeApi,
    session: Session<MemoryStorage>,
    catalog: Catalog<ApiClient, MemoryStorage>,
}

async fn signed_in_as_admin() -> Harness {
    let api = FakeApi::spawn().await.unwrap();
    let client = ApiClient::new(&api.config().unwrap()).unwrap();
    let storage = MemoryStorage::new();

    let mut session = Session::restore(storage.clone(), AdminAllowList::default());
    account::login(&client, &mut session, "emilys", &SecretString::from("emilyspass"))
        .await
        .unwrap();
    let catalog = Catalog::new(session.authorize(&client), storage);

    Harness {
        api,
        session,
        catalog,
    }
}

fn everything() -> ListQuery {
    ListQuery {
        page: Page::All,
        ..ListQuery::default()
    }
}

fn lamp() -> ProductDraft {
    ProductDraft {
        title: "Lamp".to_owned(),
        description: "Desk lamp".to_owned(),
        price: Decimal::new(1999, 2),
        category: "home-decoration".to_owned(),
        stock: 4,
        ..ProductDraft::default()
    }
}

#[tokio::test]
async fn test_created_product_survives_refresh() {
    let mut h = signed_in_as_admin().await;
    let grant = h.session.require_admin().unwrap();

    let created = h.catalog.create(grant, &lamp()).await.unwrap();
    assert!(created.id.is_local());
    assert_eq!(h.api.count("POST /products/add"), 1);

    let page = h.catalog.refresh(&everything()).await.unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.local_count, 1);
    assert_eq!(
        page.items.iter().filter(|p| p.title == "Lamp").count(),
        1,
        "the API echo must not show up as a second row"
    );
}

#[tokio::test]
async fn test_repeated_edits_keep_one_fork() {
    let mut h = signed_in_as_admin().await;
    h.catalog.refresh(&everything()).await.unwrap();

    for title in ["Mascara v2", "Mascara v3"] {
        let grant = h.session.require_admin().unwrap();
        let changes = ProductChanges {
            title: Some(title.to_owned()),
            ..ProductChanges::default()
        };
        h.catalog
            .update(grant, &ProductId::Remote(1), &changes)
            .await
            .unwrap();
    }
    assert_eq!(h.api.count("PUT /products/1"), 2);

    let page = h.catalog.refresh(&everything()).await.unwrap();
    let original = page
        .items
        .iter()
        .find(|p| p.id == ProductId::Remote(1))
        .unwrap();
    assert_eq!(original.title, "Essence Mascara Lash Princess");

    let forks: Vec<_> = page
        .items
        .iter()
        .filter(|p| p.original_api_id == Some(1))
        .collect();
    assert_eq!(forks.len(), 1);
    assert_eq!(forks[0].title, "Mascara v3");
    assert!(forks[0].edited_from_api);
}

#[tokio::test]
async fn test_delete_rolls_back_on_failure() {
    let mut h = signed_in_as_admin().await;
    h.catalog.refresh(&everything()).await.unwrap();
    let before: Vec<_> = h.catalog.cached().iter().map(|p| p.id.clone()).collect();

    h.api.fail_deletes(true);
    let grant = h.session.require_admin().unwrap();
    let err = h
        .catalog
        .delete(grant, &ProductId::Remote(3))
        .await
        .unwrap_err();
    assert!(err.is_remote());
    let after: Vec<_> = h.catalog.cached().iter().map(|p| p.id.clone()).collect();
    assert_eq!(after, before);

    h.api.fail_deletes(false);
    let grant = h.session.require_admin().unwrap();
    assert!(h.catalog.delete(grant, &ProductId::Remote(3)).await.unwrap());
    assert!(!h.catalog.delete(grant, &ProductId::Remote(3)).await.unwrap());
    assert_eq!(h.api.count("DELETE /products/3"), 2);

    let page = h.catalog.refresh(&everything()).await.unwrap();
    assert!(page.items.iter().all(|p| p.id != ProductId::Remote(3)));
    assert!(matches!(
        h.catalog.get(&ProductId::Remote(3)).await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_search_spans_both_sources() {
    let mut h = signed_in_as_admin().await;
    let grant = h.session.require_admin().unwrap();
    h.catalog
        .create(
            grant,
            &ProductDraft {
                title: "Mascara remover".to_owned(),
                price: Decimal::new(550, 2),
                category: "beauty".to_owned(),
                ..lamp()
            },
        )
        .await
        .unwrap();

    let query = ListQuery {
        search: Some("MASCARA".to_owned()),
        sort: SortField::Price,
        ..ListQuery::default()
    };
    let page = h.catalog.refresh(&query).await.unwrap();
    let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Mascara remover", "Essence Mascara Lash Princess"]);
    assert!(h.api.requests().iter().any(|r| r.starts_with("GET /products/search?q=MASCARA&limit=0")));
}

#[tokio::test]
async fn test_local_records_persist_across_restarts() {
    let api = FakeApi::spawn().await.unwrap();
    let config = api.config().unwrap();
    let client = ApiClient::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let created = {
        let storage = FileStorage::open(dir.path()).unwrap();
        let mut session = Session::restore(storage.clone(), config.admins.clone());
        account::login(&client, &mut session, "emilys", &SecretString::from("emilyspass"))
            .await
            .unwrap();
        let mut catalog = Catalog::new(session.authorize(&client), storage);
        let grant = session.require_admin().unwrap();
        catalog.create(grant, &lamp()).await.unwrap()
    };

    let storage = FileStorage::open(dir.path()).unwrap();
    let session = Session::restore(storage.clone(), config.admins);
    assert!(session.is_admin());
    let catalog = Catalog::new(session.authorize(&client), storage);
    assert_eq!(catalog.store().list(), vec![created.clone()]);
    assert_eq!(catalog.get(&created.id).await.unwrap(), created);
}
