//! Shared state for command handlers.

use std::sync::Arc;

use stockroom_admin::{
    AdminConfig, ApiClient, Catalog, ConfigError, FileStorage, GatewayError, KeyValueStorage,
    MemoryStorage, Session, StorageError,
};
use thiserror::Error;

/// Storage shared by the session and the catalog.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// Errors raised while setting up the context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Configuration, API client, session and catalog for one invocation.
pub struct AppContext {
    pub config: AdminConfig,
    /// Client without credentials, used for sign-in.
    pub api: ApiClient,
    pub session: Session<SharedStorage>,
    pub catalog: Catalog<ApiClient, SharedStorage>,
    pub storage: SharedStorage,
    /// Print JSON instead of text.
    pub json: bool,
}

impl AppContext {
    /// Load configuration, open storage and restore the session.
    ///
    /// With `ephemeral` nothing is read from or written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the data directory
    /// cannot be created or the HTTP client cannot be built.
    pub fn load(ephemeral: bool, json: bool) -> Result<Self, ContextError> {
        let config = AdminConfig::from_env()?;

        let storage: SharedStorage = if ephemeral {
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(FileStorage::open(config.data_dir.clone())?)
        };
        tracing::debug!(ephemeral, data_dir = %config.data_dir.display(), "storage opened");

        let api = ApiClient::new(&config)?;
        let session = Session::restore(Arc::clone(&storage), config.admins.clone());
        let catalog = Catalog::new(session.authorize(&api), Arc::clone(&storage));

        Ok(Self {
            config,
            api,
            session,
            catalog,
            storage,
            json,
        })
    }

    /// Rebuild the catalog gateway after the session changed.
    pub fn reauthorize(&mut self) {
        self.catalog = Catalog::new(self.session.authorize(&self.api), Arc::clone(&self.storage));
    }
}
