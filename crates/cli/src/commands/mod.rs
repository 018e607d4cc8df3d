//! Command handlers.
//!
//! Each handler takes the [`AppContext`](crate::context::AppContext) and the
//! parsed arguments, and prints its result through [`crate::output`].

pub mod account;
pub mod local;
pub mod products;

use stockroom_admin::account::AccountError;
use stockroom_admin::{CatalogError, GatewayError, SessionError, StorageError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to format output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
