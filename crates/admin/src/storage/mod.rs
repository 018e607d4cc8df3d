//! Key-value storage for persisted local state.
//!
//! Mirrors the browser storage contract: string keys, string values, and
//! synchronous whole-value reads and writes. Writers are not coordinated
//! across processes; the last write wins.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying file operation failed.
    #[error("Storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// Keys are limited to ASCII letters, digits, `_` and `-`.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String key-value storage.
pub trait KeyValueStorage: Send + Sync {
    /// Value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the read fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the removal fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("local_products").is_ok());
        assert!(validate_key("accessToken").is_ok());
        assert!(validate_key("auth-user-2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a.b").is_err());
    }
}
