//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOCKROOM_API_URL` - Base URL of the catalog API (default: <https://dummyjson.com>)
//! - `STOCKROOM_DATA_DIR` - Directory for persisted local state (default: `.stockroom`)
//! - `STOCKROOM_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: client default)
//! - `STOCKROOM_ADMIN_USERNAMES` - Comma-separated usernames treated as admins
//! - `STOCKROOM_ADMIN_EMAILS` - Comma-separated emails treated as admins

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://dummyjson.com";
const DEFAULT_DATA_DIR: &str = ".stockroom";
const DEFAULT_ADMIN_USERNAMES: &[&str] = &["admin", "emilys"];
const DEFAULT_ADMIN_EMAILS: &[&str] = &["admin@example.com", "emily.johnson@x.dummyjson.com"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin client configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the catalog API
    pub api_url: Url,
    /// Directory holding persisted local state
    pub data_dir: PathBuf,
    /// Per-request timeout; `None` keeps the HTTP client's default
    pub http_timeout: Option<Duration>,
    /// Who counts as an administrator
    pub admins: AdminAllowList,
}

/// Usernames and emails that grant the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAllowList {
    pub usernames: Vec<String>,
    pub emails: Vec<String>,
}

impl Default for AdminAllowList {
    fn default() -> Self {
        Self {
            usernames: DEFAULT_ADMIN_USERNAMES.iter().map(|s| (*s).to_owned()).collect(),
            emails: DEFAULT_ADMIN_EMAILS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl AdminAllowList {
    /// Whether `username` is on the list (case-insensitive).
    #[must_use]
    pub fn has_username(&self, username: &str) -> bool {
        self.usernames.iter().any(|u| u.eq_ignore_ascii_case(username.trim()))
    }

    /// Whether `email` is on the list (case-insensitive).
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e.eq_ignore_ascii_case(email.trim()))
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let api_url = parse_api_url(
            "STOCKROOM_API_URL",
            &get("STOCKROOM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
        )?;
        let data_dir = PathBuf::from(
            get("STOCKROOM_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned()),
        );
        let http_timeout = get("STOCKROOM_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_timeout("STOCKROOM_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?;

        let mut admins = AdminAllowList::default();
        if let Some(raw) = get("STOCKROOM_ADMIN_USERNAMES") {
            admins.usernames = split_list(&raw);
        }
        if let Some(raw) = get("STOCKROOM_ADMIN_EMAILS") {
            admins.emails = split_list(&raw);
        }

        Ok(Self {
            api_url,
            data_dir,
            http_timeout,
            admins,
        })
    }
}

fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "must be greater than zero".to_owned(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
