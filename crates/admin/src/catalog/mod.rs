//! Reconciliation of remote and local products.
//!
//! [`Catalog`] merges the catalog API with the local record store into one
//! view and implements create, update and delete on top of an API whose
//! writes are simulations:
//!
//! - **Create** writes a local record first, then tries the remote call.
//!   A remote failure is logged; the local record stays.
//! - **Update** of a local record merges in place. Update of a remote record
//!   forks it: a local copy marked with `originalApiId` replaces any earlier
//!   fork, and the cached remote row is left untouched.
//! - **Delete** of a remote record removes it from the cached list before
//!   the remote call and restores it at the same position if the call fails.
//!
//! Mutations take `&mut self` and an [`AdminGrant`], so writers are
//! serialized and can only run from an admin session.

mod optimistic;
mod view;

#[cfg(test)]
mod tests;

pub use optimistic::{Optimistic, OptimisticCommand};
pub use view::{CatalogPage, sort_products};

use std::collections::HashSet;

use chrono::Utc;
use stockroom_core::validation::{validate_changes, validate_draft};
use stockroom_core::{Product, ProductChanges, ProductDraft, ProductId};
use tracing::{debug, info, instrument, warn};

use crate::api::{CategoryInfo, ListQuery, ProductGateway};
use crate::error::CatalogError;
use crate::session::AdminGrant;
use crate::storage::KeyValueStorage;
use crate::store::LocalStore;

/// Merged view over the catalog API and the local record store.
#[derive(Debug)]
pub struct Catalog<G, S> {
    gateway: G,
    store: LocalStore<S>,
    /// Remote items from the last refresh.
    remote: Vec<Product>,
    /// Remote ids deleted through this catalog.
    deleted: HashSet<u64>,
}

impl<G: ProductGateway, S: KeyValueStorage> Catalog<G, S> {
    /// Create a catalog over `gateway` and local `storage`.
    pub fn new(gateway: G, storage: S) -> Self {
        Self {
            gateway,
            store: LocalStore::new(storage),
            remote: Vec::new(),
            deleted: HashSet::new(),
        }
    }

    /// The remote gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The local record store.
    pub const fn store(&self) -> &LocalStore<S> {
        &self.store
    }

    /// Remote items cached by the last refresh, in API order.
    pub fn cached(&self) -> &[Product] {
        &self.remote
    }

    /// Whether `remote_id` was deleted through this catalog.
    pub fn is_deleted(&self, remote_id: u64) -> bool {
        self.deleted.contains(&remote_id)
    }

    /// Fetch every remote match for the query's search and category, cache
    /// it, and return the requested page of the merged view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Gateway`] if the remote listing fails; the
    /// previous cache is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self, query: &ListQuery) -> Result<CatalogPage, CatalogError> {
        let page = self.gateway.list(&query.all_pages()).await?;
        debug!(fetched = page.items.len(), total = page.total, "remote products cached");
        self.remote = page.items;
        Ok(self.view(query))
    }

    /// The merged view for `query`, from the cache and the local store.
    ///
    /// Makes no network calls.
    pub fn view(&self, query: &ListQuery) -> CatalogPage {
        view::merge(&self.remote, &self.deleted, &self.store.list(), query)
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown local ids and remote
    /// ids deleted here; remote lookups fail with the gateway's error.
    pub async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        match id {
            ProductId::Local(_) => self
                .store
                .find(id)
                .ok_or_else(|| CatalogError::NotFound(id.clone())),
            ProductId::Remote(remote_id) => {
                if self.is_deleted(*remote_id) {
                    return Err(CatalogError::NotFound(id.clone()));
                }
                Ok(self.gateway.get(*remote_id).await?)
            }
        }
    }

    /// Create a product locally, then mirror it upstream on a best-effort
    /// basis.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for bad input and
    /// [`CatalogError::Storage`] if the local write fails. Remote failures
    /// are only logged.
    #[instrument(skip(self, _grant, draft), fields(title = %draft.title))]
    pub async fn create(
        &mut self,
        _grant: AdminGrant,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogError> {
        validate_draft(draft)?;

        let id = ProductId::Local(self.store.new_id());
        let product = self.store.upsert(Product::from_draft(id, draft, Utc::now()))?;
        info!(id = %product.id, "product created locally");

        match self.gateway.create(draft).await {
            Ok(echo) => debug!(echoed_id = %echo.id, "remote create acknowledged"),
            Err(e) => warn!(error = %e, id = %product.id, "remote create failed, keeping local record"),
        }

        Ok(product)
    }

    /// Apply `changes` to a product.
    ///
    /// Local records are edited in place. Remote records are forked into a
    /// local copy that replaces any earlier fork of the same remote id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for bad input,
    /// [`CatalogError::NotFound`] for unknown or deleted products, and a
    /// gateway error if an uncached remote source cannot be fetched.
    #[instrument(skip(self, _grant, changes))]
    pub async fn update(
        &mut self,
        _grant: AdminGrant,
        id: &ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, CatalogError> {
        validate_changes(changes)?;

        match id {
            ProductId::Local(_) => self.update_local(id, changes),
            ProductId::Remote(remote_id) => self.fork_remote(*remote_id, changes).await,
        }
    }

    fn update_local(
        &self,
        id: &ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, CatalogError> {
        let mut product = self
            .store
            .find(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        changes.apply_to(&mut product, Utc::now());
        let product = self.store.upsert(product)?;
        info!(%id, "local product updated");
        Ok(product)
    }

    async fn fork_remote(
        &self,
        remote_id: u64,
        changes: &ProductChanges,
    ) -> Result<Product, CatalogError> {
        if self.is_deleted(remote_id) {
            return Err(CatalogError::NotFound(ProductId::Remote(remote_id)));
        }

        let source = match self
            .remote
            .iter()
            .find(|p| p.id == ProductId::Remote(remote_id))
        {
            Some(cached) => cached.clone(),
            None => self.gateway.get(remote_id).await?,
        };

        let now = Utc::now();
        let mut fork = source;
        fork.id = ProductId::Local(self.store.new_id());
        fork.edited_from_api = true;
        fork.original_api_id = Some(remote_id);
        fork.created_at = Some(now);
        changes.apply_to(&mut fork, now);

        if let Some(previous) = self.store.fork_of(remote_id) {
            debug!(remote_id, previous_id = %previous.id, "replacing earlier fork");
        }
        let replaced = self.store.remove_forks_of(remote_id)?;
        let fork = self.store.upsert(fork)?;
        info!(remote_id, fork_id = %fork.id, replaced, "remote product forked");

        if let Err(e) = self.gateway.update(remote_id, changes).await {
            warn!(error = %e, remote_id, "remote update failed, keeping local fork");
        }

        Ok(fork)
    }

    /// Delete a product. Returns `false` if there was nothing to delete.
    ///
    /// Local records are removed from the store. For remote records the
    /// cached row and any local fork are removed before the remote call; if
    /// the call fails the row is restored (the fork is not) and the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the store cannot be written and
    /// [`CatalogError::Gateway`] if the remote delete fails.
    #[instrument(skip(self, _grant))]
    pub async fn delete(&mut self, _grant: AdminGrant, id: &ProductId) -> Result<bool, CatalogError> {
        let remote_id = match id {
            ProductId::Local(_) => {
                let removed = self.store.remove(id)?;
                info!(%id, removed, "local product deleted");
                return Ok(removed);
            }
            ProductId::Remote(remote_id) => *remote_id,
        };

        if self.is_deleted(remote_id) {
            debug!(remote_id, "already deleted");
            return Ok(false);
        }

        let pending = Optimistic::apply(&mut self.remote, RemoveCached::new(remote_id));

        let forks = match self.store.remove_forks_of(remote_id) {
            Ok(forks) => forks,
            Err(e) => {
                pending.rollback(&mut self.remote);
                return Err(e.into());
            }
        };

        let result = self.gateway.remove(remote_id).await;
        if let Err(e) = pending.settle(&mut self.remote, result) {
            warn!(error = %e, remote_id, forks, "remote delete failed, row restored");
            return Err(e.into());
        }

        self.deleted.insert(remote_id);
        info!(remote_id, forks, "remote product deleted");
        Ok(true)
    }

    /// Categories known to the API.
    ///
    /// # Errors
    ///
    /// Returns a gateway error if the request fails.
    pub async fn categories(&self) -> Result<Vec<CategoryInfo>, CatalogError> {
        Ok(self.gateway.categories().await?)
    }
}

/// Removes a remote row from the cached list, remembering where it was.
struct RemoveCached {
    remote_id: u64,
    removed: Option<(usize, Product)>,
}

impl RemoveCached {
    const fn new(remote_id: u64) -> Self {
        Self {
            remote_id,
            removed: None,
        }
    }
}

impl OptimisticCommand<Vec<Product>> for RemoveCached {
    fn apply(&mut self, target: &mut Vec<Product>) {
        let id = ProductId::Remote(self.remote_id);
        if let Some(pos) = target.iter().position(|p| p.id == id) {
            self.removed = Some((pos, target.remove(pos)));
        }
    }

    fn compensate(self, target: &mut Vec<Product>) {
        if let Some((pos, product)) = self.removed {
            target.insert(pos.min(target.len()), product);
        }
    }
}
