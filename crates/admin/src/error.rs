//! Unified error handling for catalog operations.

use stockroom_core::{ProductId, ValidationErrors};
use thiserror::Error;

use crate::api::GatewayError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Error type for [`Catalog`](crate::catalog::Catalog) operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog API call failed.
    #[error("Catalog API error: {0}")]
    Gateway(#[from] GatewayError),

    /// Local storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input was rejected before any network call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// No product with this identifier.
    #[error("Not found: {0}")]
    NotFound(ProductId),

    /// The caller is not allowed to perform the operation.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl CatalogError {
    /// Whether the failure originated upstream rather than locally.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }

    /// Per-field messages, when this is a validation failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
