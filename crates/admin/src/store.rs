//! Local record store.
//!
//! Holds products authored or edited on this side as one JSON array under a
//! single storage key. Every mutation reads the whole collection, changes it
//! and writes it back, so callers must serialize writers.

use chrono::Utc;
use rand::Rng;
use stockroom_core::{LocalId, Product, ProductId};
use tracing::{debug, warn};

use crate::storage::{KeyValueStorage, StorageError};

/// Storage key holding the local product collection.
pub const LOCAL_PRODUCTS_KEY: &str = "local_products";

const ID_SUFFIX_LEN: usize = 9;
const ID_RADIX: u32 = 36;

/// Ordered collection of local products.
#[derive(Debug, Clone)]
pub struct LocalStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> LocalStore<S> {
    /// Wrap `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// All local products in insertion order.
    ///
    /// Missing or unreadable data yields an empty list.
    pub fn list(&self) -> Vec<Product> {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read local products, treating as empty");
            Vec::new()
        })
    }

    /// The local product with `id`, if any.
    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.list().into_iter().find(|p| &p.id == id)
    }

    /// Insert `product`, or replace the record with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written. Nothing
    /// is written when the read fails.
    pub fn upsert(&self, product: Product) -> Result<Product, StorageError> {
        let product = product.normalized();
        let mut products = self.load()?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => slot.clone_from(&product),
            None => products.push(product.clone()),
        }
        self.write(&products)?;
        debug!(id = %product.id, "local product saved");
        Ok(product)
    }

    /// Remove the record with `id`. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn remove(&self, id: &ProductId) -> Result<bool, StorageError> {
        let mut products = self.load()?;
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Ok(false);
        }
        self.write(&products)?;
        debug!(%id, "local product removed");
        Ok(true)
    }

    /// Remove every local edit of the remote product `remote_id`.
    ///
    /// Returns how many records were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn remove_forks_of(&self, remote_id: u64) -> Result<usize, StorageError> {
        let mut products = self.load()?;
        let before = products.len();
        products.retain(|p| p.original_api_id != Some(remote_id));
        let removed = before - products.len();
        if removed > 0 {
            self.write(&products)?;
            debug!(remote_id, removed, "local forks removed");
        }
        Ok(removed)
    }

    /// Local edit of the remote product `remote_id`, if one exists.
    pub fn fork_of(&self, remote_id: u64) -> Option<Product> {
        self.list()
            .into_iter()
            .find(|p| p.original_api_id == Some(remote_id))
    }

    /// Delete the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(LOCAL_PRODUCTS_KEY)
    }

    /// Fresh identifier: `local_<unix-millis>_<9 base-36 chars>`.
    #[must_use]
    pub fn new_id(&self) -> LocalId {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .filter_map(|_| char::from_digit(rng.random_range(0..ID_RADIX), ID_RADIX))
            .collect();
        LocalId::from_parts(Utc::now().timestamp_millis(), &suffix)
    }

    /// Read the collection. Corrupt data reads as empty; storage failures are
    /// returned so mutations never overwrite records they could not see.
    fn load(&self) -> Result<Vec<Product>, StorageError> {
        let Some(raw) = self.storage.get(LOCAL_PRODUCTS_KEY)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "local products are corrupt, treating as empty");
            Vec::new()
        }))
    }

    fn write(&self, products: &[Product]) -> Result<(), StorageError> {
        let json = serde_json::to_string(products)?;
        self.storage.set(LOCAL_PRODUCTS_KEY, &json)
    }
}
