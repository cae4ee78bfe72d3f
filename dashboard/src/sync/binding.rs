//! # Consumer Binding
//!
//! A [`Subscription`] is what a presentation component holds while it is mounted. It
//! keeps the poll subscription alive and exposes the resource's current entry plus a
//! change stream. Dropping it unmounts: the poll count is decremented and the last drop
//! stops the poll loop.

use crate::core::error::{Result, SyncError};
use crate::sync::cache::{CacheEntry, CacheStore, EntryStatus};
use crate::sync::poller::PollGuard;
use crate::sync::registry::{ResourceId, ResourceValue};
use tokio::sync::watch;

/// A mounted consumer of one resource
pub struct Subscription {
    store: CacheStore,
    id: ResourceId,
    rx: watch::Receiver<CacheEntry>,
    _guard: PollGuard,
}

impl Subscription {
    pub(crate) fn new(store: CacheStore, id: ResourceId, guard: PollGuard) -> Self {
        let rx = store.watch(&id);
        store.read(&id);
        Self {
            store,
            id,
            rx,
            _guard: guard,
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Current entry. Like any read, starts a fetch if the entry is idle or stale.
    pub fn current(&self) -> CacheEntry {
        self.store.read(&self.id)
    }

    /// Last observed entry without touching the store
    pub fn latest(&self) -> CacheEntry {
        self.rx.borrow().clone()
    }

    pub fn status(&self) -> EntryStatus {
        self.rx.borrow().status
    }

    /// Last good value, if any
    pub fn value(&self) -> Option<ResourceValue> {
        self.rx.borrow().value.clone()
    }

    /// Wait for the next published entry.
    ///
    /// A stale entry is re-read before returning so the consumer's view always has a
    /// refresh under way once it has been invalidated.
    pub async fn changed(&mut self) -> Result<CacheEntry> {
        self.rx
            .changed()
            .await
            .map_err(|_| SyncError::Config("cache store closed".to_string()))?;
        let entry = self.rx.borrow_and_update().clone();

        if entry.status == EntryStatus::Stale {
            tracing::debug!(resource = %self.id, "Subscriber saw stale entry, re-reading");
            return Ok(self.store.read(&self.id));
        }
        Ok(entry)
    }

    /// Wait until the entry is fresh or failed, skipping intermediate states
    pub async fn settled(&mut self) -> Result<CacheEntry> {
        let mut entry = self.current();
        while matches!(
            entry.status,
            EntryStatus::Idle | EntryStatus::Loading | EntryStatus::Stale
        ) {
            entry = self.changed().await?;
        }
        Ok(entry)
    }
}
