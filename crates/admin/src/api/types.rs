//! Request and response types for the catalog API.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use stockroom_core::{Category, Product, SortField, SortOrder, UserId};

use super::GatewayError;

/// Which slice of a listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// `limit` items starting at `offset`. A zero `limit` is treated as 1,
    /// since the API reads `limit=0` as "everything".
    Window { offset: usize, limit: usize },
    /// Every matching item.
    All,
}

impl Default for Page {
    fn default() -> Self {
        Self::Window {
            offset: 0,
            limit: 10,
        }
    }
}

/// Parameters of a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text search; takes precedence over category and sort upstream.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: Page,
}

impl ListQuery {
    /// Search text with surrounding whitespace removed, if non-empty.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Same query, asking for every matching item.
    #[must_use]
    pub fn all_pages(&self) -> Self {
        Self {
            page: Page::All,
            ..self.clone()
        }
    }
}

/// One page of products as returned by the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemotePage {
    pub items: Vec<Product>,
    /// Number of matching products upstream.
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: usize,
}

impl From<ProductsResponse> for RemotePage {
    fn from(response: ProductsResponse) -> Self {
        Self {
            items: response.products,
            total: response.total,
        }
    }
}

/// A category as listed by the API.
///
/// Older API versions return bare slugs; newer ones return objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl<'de> Deserialize<'de> for CategoryInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Slug(String),
            Full {
                slug: String,
                #[serde(default)]
                name: Option<String>,
                #[serde(default)]
                url: Option<String>,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Slug(slug) => Self {
                name: Category::lenient(&slug).label(),
                slug,
                url: None,
            },
            Raw::Full { slug, name, url } => Self {
                name: name.unwrap_or_else(|| Category::lenient(&slug).label()),
                slug,
                url,
            },
        })
    }
}

/// A user profile as returned by the auth and users endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// Fields this client does not model, kept so they survive a save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// "First Last", falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Tokens issued by the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}

/// Login body; the access token arrives as `accessToken` or `token`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(flatten)]
    user: UserProfile,
}

impl LoginResponse {
    pub(crate) fn into_session(self) -> Result<LoginSession, GatewayError> {
        let access_token = self
            .access_token
            .or(self.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::Decode("login response has no access token".to_owned()))?;
        Ok(LoginSession {
            user: self.user,
            tokens: AuthTokens {
                access_token: SecretString::from(access_token),
                refresh_token: self.refresh_token.map(SecretString::from),
            },
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl RefreshResponse {
    pub(crate) fn into_tokens(self) -> Result<AuthTokens, GatewayError> {
        let access_token = self
            .access_token
            .or(self.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::Decode("refresh response has no access token".to_owned()))?;
        Ok(AuthTokens {
            access_token: SecretString::from(access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
        })
    }
}

/// Body of the user registration call.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: u8,
    pub gender: String,
    pub image: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("age", &self.age)
            .field("gender", &self.gender)
            .finish_non_exhaustive()
    }
}

/// One page of users.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersPage {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub total: usize,
}
