//! Integration tests for Stockroom.
//!
//! [`FakeApi`] serves an in-process imitation of the catalog API on an
//! ephemeral port. Like the real service it answers writes with plausible
//! bodies but never persists them, so the tests exercise the same
//! reconciliation paths as production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```
//!
//! # Test Suites
//!
//! - `gateway` - HTTP client against every endpoint
//! - `catalog` - Merged view, forks and optimistic deletes end-to-end
//! - `account` - Login, registration and session persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cmp::Ordering;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use stockroom_admin::{AdminConfig, ConfigError};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct FakeState {
    products: Vec<Value>,
    users: Vec<Value>,
    requests: Vec<String>,
    fail_deletes: bool,
    persist_registrations: bool,
}

type Shared = Arc<Mutex<FakeState>>;

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running fake catalog API. The server stops when this is dropped.
#[derive(Debug)]
pub struct FakeApi {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Start a server seeded with [`seed_products`] and [`seed_users`].
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            products: seed_products(),
            users: seed_users(),
            ..FakeState::default()
        }));

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/search", get(search_products))
            .route("/products/categories", get(categories))
            .route("/products/category/{slug}", get(products_in_category))
            .route("/products/add", post(add_product))
            .route(
                "/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/auth/refresh", post(refresh))
            .route("/users", get(list_users))
            .route("/users/add", post(add_user))
            .route("/users/{id}", put(update_user).delete(delete_user))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated configuration is rejected.
    pub fn config(&self) -> Result<AdminConfig, ConfigError> {
        let base_url = self.base_url();
        AdminConfig::from_lookup(|key| match key {
            "STOCKROOM_API_URL" => Some(base_url.clone()),
            "STOCKROOM_HTTP_TIMEOUT_SECS" => Some("5".to_owned()),
            _ => None,
        })
    }

    /// Make every `DELETE /products/{id}` fail with a 500.
    pub fn fail_deletes(&self, fail: bool) {
        lock(&self.state).fail_deletes = fail;
    }

    /// Keep registered users so they can log in afterwards.
    pub fn persist_registrations(&self, persist: bool) {
        lock(&self.state).persist_registrations = persist;
    }

    /// Requests served so far, as `METHOD /path?query`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    /// Number of served requests starting with `prefix`.
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Products the server starts with.
#[must_use]
pub fn seed_products() -> Vec<Value> {
    [
        (1, "Essence Mascara Lash Princess", "Volumizing mascara for long lashes", 9.99, "beauty", 99, 2.56),
        (2, "Eyeshadow Palette with Mirror", "Versatile palette with a built-in mirror", 19.99, "beauty", 34, 2.86),
        (3, "Powder Canister", "Finely milled setting powder", 14.99, "beauty", 89, 4.64),
        (6, "Calvin Klein CK One", "A clean, contemporary fragrance", 49.99, "fragrances", 29, 4.37),
        (121, "iPhone 5s", "Classic smartphone with fingerprint sensor", 199.99, "smartphones", 25, 2.83),
        (122, "iPhone 6", "Larger display and a slimmer design", 299.99, "smartphones", 60, 3.41),
    ]
    .into_iter()
    .map(|(id, title, description, price, category, stock, rating)| {
        json!({
            "id": id,
            "title": title,
            "description": description,
            "price": price,
            "category": category,
            "stock": stock,
            "rating": rating,
            "thumbnail": format!("https://cdn.example.com/products/{id}/thumbnail.webp"),
        })
    })
    .collect()
}

/// Users the server starts with. Each password is the username plus `pass`;
/// `emilys` is an administrator.
#[must_use]
pub fn seed_users() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "username": "emilys",
            "email": "emily.johnson@x.dummyjson.com",
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
            "role": "admin",
            "password": "emilyspass",
        }),
        json!({
            "id": 2,
            "username": "michaelw",
            "email": "michael.williams@x.dummyjson.com",
            "firstName": "Michael",
            "lastName": "Williams",
            "gender": "male",
            "role": "user",
            "password": "michaelwpass",
        }),
    ]
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let entry = format!("{} {}", request.method(), request.uri());
    lock(&state).requests.push(entry);
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    q: Option<String>,
    limit: Option<usize>,
    skip: Option<usize>,
    sort_by: Option<String>,
    order: Option<String>,
}

fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.to_lowercase().cmp(&y.to_lowercase()),
        _ => Ordering::Equal,
    }
}

fn paged(mut items: Vec<Value>, params: &ListParams) -> Json<Value> {
    if let Some(field) = &params.sort_by {
        items.sort_by(|a, b| compare_field(a, b, field));
        if params.order.as_deref() == Some("desc") {
            items.reverse();
        }
    }
    let total = items.len();
    let skip = params.skip.unwrap_or(0);
    let limit = match params.limit.unwrap_or(30) {
        0 => total,
        n => n,
    };
    let products: Vec<Value> = items.into_iter().skip(skip).take(limit).collect();
    Json(json!({
        "limit": products.len(),
        "products": products,
        "skip": skip,
        "total": total,
    }))
}

fn text(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase()
}

async fn list_products(State(state): State<Shared>, Query(params): Query<ListParams>) -> Json<Value> {
    let items = lock(&state).products.clone();
    paged(items, &params)
}

async fn search_products(
    State(state): State<Shared>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let needle = params.q.as_deref().unwrap_or_default().to_lowercase();
    let items: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|p| text(p, "title").contains(&needle) || text(p, "description").contains(&needle))
        .cloned()
        .collect();
    paged(items, &params)
}

async fn products_in_category(
    State(state): State<Shared>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let items: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|p| text(p, "category") == slug)
        .cloned()
        .collect();
    paged(items, &params)
}

async fn categories(State(state): State<Shared>) -> Json<Value> {
    let mut slugs: Vec<String> = lock(&state).products.iter().map(|p| text(p, "category")).collect();
    slugs.sort();
    slugs.dedup();
    let base = "https://dummyjson.com/products/category";
    Json(Value::Array(
        slugs
            .into_iter()
            .map(|slug| {
                let mut name = slug.clone();
                if let Some(first) = name.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                json!({ "slug": slug, "name": name, "url": format!("{base}/{slug}") })
            })
            .collect(),
    ))
}

fn find_product(state: &Shared, id: u64) -> Option<Value> {
    lock(state)
        .products
        .iter()
        .find(|p| p.get("id").and_then(Value::as_u64) == Some(id))
        .cloned()
}

fn missing_product(id: u64) -> Response {
    error(
        StatusCode::NOT_FOUND,
        &format!("Product with id '{id}' not found"),
    )
}

async fn get_product(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    find_product(&state, id).map_or_else(|| missing_product(id), |p| Json(p).into_response())
}

fn merge(base: &mut Value, patch: Map<String, Value>) {
    if let Value::Object(fields) = base {
        fields.extend(patch);
    }
}

async fn add_product(State(state): State<Shared>, Json(body): Json<Map<String, Value>>) -> Response {
    let id = lock(&state).products.len() + 1;
    let mut created = json!({ "id": id });
    merge(&mut created, body);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_product(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let Some(mut product) = find_product(&state, id) else {
        return missing_product(id);
    };
    merge(&mut product, body);
    Json(product).into_response()
}

async fn delete_product(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    if lock(&state).fail_deletes {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    let Some(mut product) = find_product(&state, id) else {
        return missing_product(id);
    };
    merge(
        &mut product,
        Map::from_iter([
            ("isDeleted".to_owned(), Value::Bool(true)),
            ("deletedOn".to_owned(), Value::String("2024-01-01T00:00:00.000Z".to_owned())),
        ]),
    );
    Json(product).into_response()
}

fn public_profile(user: &Value) -> Value {
    let mut profile = user.clone();
    if let Value::Object(fields) = &mut profile {
        fields.remove("password");
    }
    profile
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let user = lock(&state)
        .users
        .iter()
        .find(|u| {
            text(u, "username") == body.username.to_lowercase()
                && u.get("password").and_then(Value::as_str) == Some(body.password.as_str())
        })
        .cloned();
    let Some(user) = user else {
        return error(StatusCode::BAD_REQUEST, "Invalid credentials");
    };

    let id = user.get("id").and_then(Value::as_u64).unwrap_or_default();
    let mut response = public_profile(&user);
    merge(
        &mut response,
        Map::from_iter([
            ("accessToken".to_owned(), Value::String(format!("token-{id}"))),
            ("refreshToken".to_owned(), Value::String(format!("refresh-{id}"))),
        ]),
    );
    Json(response).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let id = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer token-"))
        .and_then(|id| id.parse::<u64>().ok());
    let user = id.and_then(|id| {
        lock(&state)
            .users
            .iter()
            .find(|u| u.get("id").and_then(Value::as_u64) == Some(id))
            .cloned()
    });
    user.map_or_else(
        || error(StatusCode::UNAUTHORIZED, "Invalid/Expired Token!"),
        |u| Json(public_profile(&u)).into_response(),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    refresh_token: String,
}

async fn refresh(Json(body): Json<RefreshBody>) -> Response {
    let Some(id) = body.refresh_token.strip_prefix("refresh-") else {
        return error(StatusCode::FORBIDDEN, "Invalid refresh token");
    };
    Json(json!({
        "accessToken": format!("token-{id}"),
        "refreshToken": format!("refresh-{id}"),
    }))
    .into_response()
}

async fn list_users(State(state): State<Shared>) -> Json<Value> {
    let users: Vec<Value> = lock(&state).users.iter().map(public_profile).collect();
    Json(json!({ "total": users.len(), "users": users, "skip": 0, "limit": users.len() }))
}

async fn add_user(State(state): State<Shared>, Json(body): Json<Map<String, Value>>) -> Response {
    let mut state = lock(&state);
    let id = state.users.len() + 1;
    let mut user = json!({ "id": id });
    merge(&mut user, body);
    let profile = public_profile(&user);
    if state.persist_registrations {
        state.users.push(user);
    }
    (StatusCode::CREATED, Json(profile)).into_response()
}

fn find_user(state: &Shared, id: u64) -> Option<Value> {
    lock(state)
        .users
        .iter()
        .find(|u| u.get("id").and_then(Value::as_u64) == Some(id))
        .map(public_profile)
}

async fn update_user(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let Some(mut user) = find_user(&state, id) else {
        return error(StatusCode::NOT_FOUND, &format!("User with id '{id}' not found"));
    };
    merge(&mut user, body);
    Json(user).into_response()
}

async fn delete_user(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let Some(mut user) = find_user(&state, id) else {
        return error(StatusCode::NOT_FOUND, &format!("User with id '{id}' not found"));
    };
    merge(
        &mut user,
        Map::from_iter([("isDeleted".to_owned(), Value::Bool(true))]),
    );
    Json(user).into_response()
}
