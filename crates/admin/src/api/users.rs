//! User endpoints.

use stockroom_core::UserId;
use tracing::instrument;

use super::{ApiClient, GatewayError, NewUser, UserProfile, UsersPage};

impl ApiClient {
    /// Register a user. The account is simulated upstream and cannot log in
    /// unless the API happens to know the credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: &NewUser) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["users", "add"])?;
        self.post_json(url, user).await
    }

    /// List users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<UsersPage, GatewayError> {
        let url = self.endpoint(&["users"])?;
        self.get_json(url).await
    }

    /// Apply a JSON patch to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, patch))]
    pub async fn update_user(
        &self,
        id: UserId,
        patch: &serde_json::Value,
    ) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["users", &id.to_string()])?;
        self.put_json(url, patch).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["users", &id.to_string()])?;
        self.delete(url).await
    }
}
