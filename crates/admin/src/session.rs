//! Authenticated user state.
//!
//! The session owns the current profile and access token, persists both so
//! they survive a restart, and decides whether the user is an administrator.
//! Catalog mutations demand an [`AdminGrant`], which only [`Session`] can
//! issue.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, UserProfile};
use crate::config::AdminAllowList;
use crate::storage::{KeyValueStorage, StorageError};

/// Storage key holding the raw access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key holding the JSON user profile.
pub const AUTH_USER_KEY: &str = "auth_user";

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Admin privileges required")]
    Forbidden,

    #[error("Invalid profile update: {0}")]
    InvalidUpdate(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Proof that the holder checked for an admin session.
///
/// Cannot be built outside this module.
#[derive(Debug, Clone, Copy)]
pub struct AdminGrant {
    _private: (),
}

#[derive(Debug)]
struct Credentials {
    user: UserProfile,
    token: SecretString,
    is_admin: bool,
}

/// Current user and token, backed by persistent storage.
#[derive(Debug)]
pub struct Session<S> {
    storage: S,
    admins: AdminAllowList,
    credentials: Option<Credentials>,
}

impl<S: KeyValueStorage> Session<S> {
    /// Rehydrate from storage.
    ///
    /// Both the token and the profile must be present and readable;
    /// otherwise the session starts logged out.
    pub fn restore(storage: S, admins: AdminAllowList) -> Self {
        let credentials = load_credentials(&storage, &admins);
        Self {
            storage,
            admins,
            credentials,
        }
    }

    /// Store a freshly authenticated user and token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be persisted. The
    /// in-memory session is updated regardless.
    pub fn set_credentials(&mut self, user: UserProfile, token: SecretString) -> Result<(), SessionError> {
        let is_admin = is_admin_user(&user, &self.admins);
        info!(username = %user.username, is_admin, "credentials set");

        let user_json = serde_json::to_string(&user).map_err(StorageError::from)?;
        let token_raw = token.expose_secret().to_owned();
        self.credentials = Some(Credentials {
            user,
            token,
            is_admin,
        });

        self.storage.set(ACCESS_TOKEN_KEY, &token_raw)?;
        self.storage.set(AUTH_USER_KEY, &user_json)?;
        Ok(())
    }

    /// Merge `patch` (a JSON object) into the profile and persist it.
    ///
    /// The admin flag is recomputed from the merged profile.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when logged out and
    /// [`SessionError::InvalidUpdate`] when the patch is not an object or
    /// produces an invalid profile.
    pub fn update_user(&mut self, patch: &serde_json::Value) -> Result<&UserProfile, SessionError> {
        let credentials = self
            .credentials
            .as_mut()
            .ok_or(SessionError::NotAuthenticated)?;
        let serde_json::Value::Object(changes) = patch else {
            return Err(SessionError::InvalidUpdate("expected a JSON object".to_owned()));
        };

        let mut merged = serde_json::to_value(&credentials.user).map_err(StorageError::from)?;
        if let serde_json::Value::Object(fields) = &mut merged {
            for (key, value) in changes {
                fields.insert(key.clone(), value.clone());
            }
        }
        let user: UserProfile = serde_json::from_value(merged)
            .map_err(|e| SessionError::InvalidUpdate(e.to_string()))?;

        credentials.is_admin = is_admin_user(&user, &self.admins);
        credentials.user = user;

        let user_json = serde_json::to_string(&credentials.user).map_err(StorageError::from)?;
        self.storage.set(AUTH_USER_KEY, &user_json)?;
        Ok(&credentials.user)
    }

    /// Forget the user, in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be removed; the in-memory
    /// session is cleared regardless.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(credentials) = self.credentials.take() {
            info!(username = %credentials.user.username, "logged out");
        }
        let token = self.storage.remove(ACCESS_TOKEN_KEY);
        let user = self.storage.remove(AUTH_USER_KEY);
        token?;
        user?;
        Ok(())
    }

    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether the logged-in user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.credentials.as_ref().is_some_and(|c| c.is_admin)
    }

    /// Current user profile.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    /// Current access token.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.credentials.as_ref().map(|c| &c.token)
    }

    /// `api` with this session's token attached, if any.
    #[must_use]
    pub fn authorize(&self, api: &ApiClient) -> ApiClient {
        self.token()
            .map_or_else(|| api.without_token(), |token| api.with_token(token.clone()))
    }

    /// Proof of admin rights for catalog mutations.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when logged out and
    /// [`SessionError::Forbidden`] for non-admin users.
    pub fn require_admin(&self) -> Result<AdminGrant, SessionError> {
        match &self.credentials {
            None => Err(SessionError::NotAuthenticated),
            Some(c) if c.is_admin => Ok(AdminGrant { _private: () }),
            Some(_) => Err(SessionError::Forbidden),
        }
    }
}

/// Whether `user` is an administrator.
///
/// True when the username or email is on the allow-list (case-insensitive),
/// the role is `admin`, or the profile carries `isAdmin: true`.
#[must_use]
pub fn is_admin_user(user: &UserProfile, admins: &AdminAllowList) -> bool {
    admins.has_username(&user.username)
        || user.email.as_deref().is_some_and(|email| admins.has_email(email))
        || user.role.as_deref() == Some("admin")
        || user.is_admin == Some(true)
}

fn load_credentials<S: KeyValueStorage>(storage: &S, admins: &AdminAllowList) -> Option<Credentials> {
    let token = read_or_warn(storage, ACCESS_TOKEN_KEY)?;
    let raw_user = read_or_warn(storage, AUTH_USER_KEY)?;
    let user: UserProfile = serde_json::from_str(&raw_user)
        .map_err(|e| warn!(error = %e, "stored user profile is corrupt, starting logged out"))
        .ok()?;
    Some(Credentials {
        is_admin: is_admin_user(&user, admins),
        user,
        token: SecretString::from(token),
    })
}

fn read_or_warn<S: KeyValueStorage>(storage: &S, key: &str) -> Option<String> {
    storage
        .get(key)
        .map_err(|e| warn!(error = %e, key, "failed to read session state"))
        .ok()
        .flatten()
        .filter(|value| !value.is_empty())
}
