//! Catalog API client.
//!
//! Wraps the upstream REST catalog (products, auth and users endpoints). All
//! mutation endpoints upstream are simulations: they answer with a plausible
//! object but persist nothing, so callers never rely on a later read
//! reflecting a write.
//!
//! # API Reference
//!
//! - Base URL: configurable, `https://dummyjson.com` by default
//! - Authentication: `Authorization: Bearer <accessToken>` where required

mod auth;
mod error;
mod products;
mod types;
mod users;

pub use error::GatewayError;
pub use products::{ProductGateway, build_list_url};
pub use types::*;

use std::sync::Arc;

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::AdminConfig;
use error::ErrorBody;

/// Catalog API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    token: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &AdminConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
            token: None,
        })
    }

    /// A client that sends `token` as a bearer credential.
    #[must_use]
    pub fn with_token(&self, token: SecretString) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: Some(token),
        }
    }

    /// The same client with no bearer credential.
    #[must_use]
    pub fn without_token(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: None,
        }
    }

    /// Whether a bearer token is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `<base>/<segments...>` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        endpoint(&self.inner.base_url, segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Execute a GET request.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        debug!(%url, "GET");
        let response = self.authorized(self.inner.client.get(url)).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, GatewayError> {
        debug!(%url, "POST");
        let response = self
            .authorized(self.inner.client.post(url))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, GatewayError> {
        debug!(%url, "PUT");
        let response = self
            .authorized(self.inner.client.put(url))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a DELETE request, ignoring the response body.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), GatewayError> {
        debug!(%url, "DELETE");
        let response = self.authorized(self.inner.client.delete(url)).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        if response.status().is_success() {
            let body = response.bytes().await?;
            return serde_json::from_slice(&body)
                .map_err(|e| GatewayError::Decode(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Turn a non-success response into a [`GatewayError::Status`].
    async fn parse_error(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty());
        GatewayError::Status { status, message }
    }
}

pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| GatewayError::Url(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let base = Url::parse("https://dummyjson.com").unwrap();
        assert_eq!(
            endpoint(&base, &["products", "5"]).unwrap().as_str(),
            "https://dummyjson.com/products/5"
        );

        let nested = Url::parse("http://localhost:8080/api/").unwrap();
        assert_eq!(
            endpoint(&nested, &["auth", "login"]).unwrap().as_str(),
            "http://localhost:8080/api/auth/login"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://dummyjson.com").unwrap();
        assert_eq!(
            endpoint(&base, &["products", "category", "a/b"]).unwrap().as_str(),
            "https://dummyjson.com/products/category/a%2Fb"
        );
    }

    #[test]
    fn test_token_is_not_debug_printed() {
        let config = AdminConfig::from_lookup(|_| None).unwrap();
        let client = ApiClient::new(&config)
            .unwrap()
            .with_token(SecretString::from("very-secret"));
        let debug = format!("{client:?}");
        assert!(!debug.contains("very-secret"));
        assert!(client.is_authenticated());
        assert!(!client.without_token().is_authenticated());
    }
}
