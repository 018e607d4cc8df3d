//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, AuthTokens, GatewayError, LoginResponse, LoginSession, RefreshResponse, UserProfile};

/// Lifetime requested for access tokens, in minutes.
const TOKEN_LIFETIME_MINS: u32 = 60;

impl ApiClient {
    /// Exchange a username and password for a profile and tokens.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Status`] for rejected credentials and
    /// [`GatewayError::Decode`] if the response has no access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<LoginSession, GatewayError> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
            "expiresInMins": TOKEN_LIFETIME_MINS,
        });
        let response: LoginResponse = self.post_json(url, &body).await?;
        response.into_session()
    }

    /// Profile of the user owning the attached token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthenticated`] when no token is attached.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, GatewayError> {
        if !self.is_authenticated() {
            return Err(GatewayError::Unauthenticated);
        }
        let url = self.endpoint(&["auth", "me"])?;
        self.get_json(url).await
    }

    /// Trade a refresh token for a fresh pair of tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is rejected.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<AuthTokens, GatewayError> {
        let url = self.endpoint(&["auth", "refresh"])?;
        let body = json!({
            "refreshToken": refresh_token.expose_secret(),
            "expiresInMins": TOKEN_LIFETIME_MINS,
        });
        let response: RefreshResponse = self.post_json(url, &body).await?;
        response.into_tokens()
    }
}
