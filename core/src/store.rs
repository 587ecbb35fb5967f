//! In-memory product collection kept in sync with the backend.
//!
//! # Design
//! The store never patches its collection. Every successful create, update
//! or delete is followed by a full list fetch, and the collection is only
//! ever written by replacing it wholesale with that response. The extra
//! round trip buys read-your-writes without any merge logic.
//!
//! `loading` and `posting` are busy flags per operation class. Each is a
//! counter of in-flight holders behind a scoped `BusyGuard`, so the flag is
//! released on every exit path (success, error, or the future being dropped)
//! and a nested hold, like delete's refetch, does not clear it early.
//!
//! The store is single-threaded: state sits in `Cell`/`RefCell` and no
//! borrow is held across an await. Overlapping calls are neither queued nor
//! cancelled; the last one to settle decides the collection.

use std::cell::{Cell, RefCell};

use tracing::info;

use crate::api::ProductApi;
use crate::error::ApiResult;
use crate::transport::Transport;
use crate::types::{Product, ProductBody, ProductId};

#[derive(Debug, Default)]
struct BusyFlag {
    in_flight: Cell<u32>,
}

impl BusyFlag {
    fn hold(&self) -> BusyGuard<'_> {
        self.in_flight.set(self.in_flight.get() + 1);
        BusyGuard { flag: self }
    }

    fn is_busy(&self) -> bool {
        self.in_flight.get() > 0
    }
}

struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let in_flight = &self.flag.in_flight;
        in_flight.set(in_flight.get().saturating_sub(1));
    }
}

/// Product collection plus the busy flags the UI gates its buttons on.
#[derive(Debug)]
pub struct SyncStore<T> {
    api: ProductApi<T>,
    products: RefCell<Vec<Product>>,
    revision: Cell<u64>,
    loading: BusyFlag,
    posting: BusyFlag,
}

impl<T: Transport> SyncStore<T> {
    pub fn new(api: ProductApi<T>) -> Self {
        Self {
            api,
            products: RefCell::new(Vec::new()),
            revision: Cell::new(0),
            loading: BusyFlag::default(),
            posting: BusyFlag::default(),
        }
    }

    pub fn api(&self) -> &ProductApi<T> {
        &self.api
    }

    /// Snapshot of the collection in server order.
    pub fn products(&self) -> Vec<Product> {
        self.products.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.products.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.borrow().is_empty()
    }

    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.products
            .borrow()
            .iter()
            .find(|product| product.id.as_ref() == Some(id))
            .cloned()
    }

    /// True while a list fetch or a delete is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    /// True while a create or an update is in flight.
    pub fn is_posting(&self) -> bool {
        self.posting.is_busy()
    }

    /// Bumped every time the collection is replaced by a list response.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Fetch the full list and replace the collection with it. On error the
    /// previous collection is left as it was.
    pub async fn refresh(&self) -> ApiResult<()> {
        let _busy = self.loading.hold();
        let products = self.api.list().await?;
        let count = products.len();
        *self.products.borrow_mut() = products;
        self.revision.set(self.revision.get() + 1);
        info!(count, revision = self.revision.get(), "product list refreshed");
        Ok(())
    }

    /// Create, then refetch. The refetch is skipped if the create fails.
    pub async fn create(&self, body: &ProductBody) -> ApiResult<Option<Product>> {
        let _busy = self.posting.hold();
        let created = self.api.create(body).await?;
        self.refresh().await?;
        Ok(created)
    }

    /// Update, then refetch. The refetch is skipped if the update fails.
    pub async fn update(&self, id: &ProductId, body: &ProductBody) -> ApiResult<Option<Product>> {
        let _busy = self.posting.hold();
        let updated = self.api.update(id, body).await?;
        self.refresh().await?;
        Ok(updated)
    }

    /// Delete, then refetch. Holds `loading` across both calls.
    pub async fn delete(&self, id: &ProductId) -> ApiResult<()> {
        let _busy = self.loading.hold();
        self.api.delete(id).await?;
        self.refresh().await
    }
}
