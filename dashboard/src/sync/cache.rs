//! # Cache Store
//!
//! Process-wide map from [`ResourceId`] to its last known state.
//!
//! ## Concurrency
//!
//! The slot map sits behind one `parking_lot::Mutex` that is only held for synchronous
//! bookkeeping, never across an `.await`, so `read`, `invalidate` and `commit` are atomic
//! with respect to each other. Network I/O runs in spawned tasks that report back through
//! [`CacheStore::commit`].
//!
//! ## Ordering
//!
//! Every fetch is stamped with the slot's next generation. A commit whose generation is not
//! the slot's latest is discarded, so an older response can never overwrite the outcome of
//! a fetch started after it (last request wins).
//!
//! ## Observation
//!
//! Each slot owns a `tokio::sync::watch` channel; every state change is published to it.
//! Consumer bindings hold receivers and re-render from them.

use crate::core::error::{Result, SyncError};
use crate::core::service::Transport;
use crate::debug::task_tracker::spawn_tracked;
use crate::sync::policy;
use crate::sync::registry::{ResourceId, ResourceKey, ResourceValue};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Lifecycle state of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Never fetched
    Idle,
    /// A fetch is in flight
    Loading,
    /// Holds the outcome of the latest fetch
    Fresh,
    /// Value retained for display but known to need re-fetching
    Stale,
    /// Latest fetch failed; last good value (if any) retained
    Error,
}

/// Snapshot of one slot
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Last validated value. `None` until the first successful fetch.
    pub value: Option<ResourceValue>,
    pub status: EntryStatus,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Last fault, cleared by the next successful commit
    pub error: Option<SyncError>,
}

impl CacheEntry {
    fn idle() -> Self {
        Self {
            value: None,
            status: EntryStatus::Idle,
            last_fetched_at: None,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == EntryStatus::Loading
    }
}

/// Proof that a fetch was started, required to commit its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: ResourceId,
    pub generation: u64,
}

struct Slot {
    entry: CacheEntry,
    /// Generation of the most recently started fetch
    latest: u64,
    tx: watch::Sender<CacheEntry>,
}

impl Slot {
    fn new() -> Self {
        let entry = CacheEntry::idle();
        let (tx, _rx) = watch::channel(entry.clone());
        Self { entry, latest: 0, tx }
    }

    fn publish(&self) {
        self.tx.send_replace(self.entry.clone());
    }

    fn begin(&mut self, id: &ResourceId) -> FetchTicket {
        self.latest += 1;
        self.entry.status = EntryStatus::Loading;
        self.publish();
        FetchTicket {
            id: id.clone(),
            generation: self.latest,
        }
    }
}

struct StoreInner {
    slots: Mutex<HashMap<ResourceId, Slot>>,
    transport: Arc<dyn Transport>,
}

/// Shared cache of every remote resource. Cloning is cheap and shares the same store.
///
/// Methods that may start a fetch (`read`, `refetch`, `fetch`) spawn onto the current
/// tokio runtime and must be called from within one.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
}

impl CacheStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                slots: Mutex::new(HashMap::new()),
                transport,
            }),
        }
    }

    /// Current entry, starting a background fetch if the entry is idle or stale.
    ///
    /// Never blocks. A read that finds the entry loading attaches to the in-flight fetch
    /// instead of issuing another request.
    pub fn read(&self, id: &ResourceId) -> CacheEntry {
        let (entry, ticket) = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(id.clone()).or_insert_with(Slot::new);
            let ticket = match slot.entry.status {
                EntryStatus::Idle | EntryStatus::Stale => Some(slot.begin(id)),
                EntryStatus::Loading | EntryStatus::Fresh | EntryStatus::Error => None,
            };
            (slot.entry.clone(), ticket)
        };

        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
        entry
    }

    /// Entry without side effects
    pub fn entry(&self, id: &ResourceId) -> Option<CacheEntry> {
        self.inner.slots.lock().get(id).map(|slot| slot.entry.clone())
    }

    pub fn status(&self, id: &ResourceId) -> Option<EntryStatus> {
        self.inner.slots.lock().get(id).map(|slot| slot.entry.status)
    }

    /// Mark a fresh (or failed) entry stale. No-op while loading, when already stale,
    /// or when nothing has been fetched yet. Returns whether the entry changed.
    pub fn invalidate(&self, id: &ResourceId) -> bool {
        let mut slots = self.inner.slots.lock();
        let Some(slot) = slots.get_mut(id) else {
            return false;
        };
        match slot.entry.status {
            EntryStatus::Fresh | EntryStatus::Error => {
                slot.entry.status = EntryStatus::Stale;
                slot.publish();
                tracing::debug!(resource = %id, "Invalidated");
                true
            }
            EntryStatus::Idle | EntryStatus::Loading | EntryStatus::Stale => false,
        }
    }

    /// Invalidate every cached identity of a logical resource
    pub fn invalidate_key(&self, key: ResourceKey) -> Vec<ResourceId> {
        self.ids_for(key)
            .into_iter()
            .filter(|id| self.invalidate(id))
            .collect()
    }

    /// Invalidation after a successful write to `key`.
    ///
    /// Loading slots get a superseding fetch because their in-flight request was issued
    /// before the write; every other slot is invalidated. Done under one lock so no
    /// commit can slip between the status check and the transition.
    pub fn invalidate_after_write(&self, key: ResourceKey) -> usize {
        let mut tickets = Vec::new();
        let mut touched = 0;
        {
            let mut slots = self.inner.slots.lock();
            for (id, slot) in slots.iter_mut().filter(|(id, _)| id.key() == key) {
                match slot.entry.status {
                    EntryStatus::Loading => {
                        tracing::debug!(resource = %id, "Superseding in-flight fetch after write");
                        tickets.push(slot.begin(id));
                        touched += 1;
                    }
                    EntryStatus::Fresh | EntryStatus::Error => {
                        slot.entry.status = EntryStatus::Stale;
                        slot.publish();
                        tracing::debug!(resource = %id, "Invalidated after write");
                        touched += 1;
                    }
                    EntryStatus::Idle | EntryStatus::Stale => {}
                }
            }
        }
        for ticket in tickets {
            self.spawn_fetch(ticket);
        }
        touched
    }

    /// Start a new fetch unconditionally, superseding any fetch in flight
    pub fn refetch(&self, id: &ResourceId) -> CacheEntry {
        let (entry, ticket) = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(id.clone()).or_insert_with(Slot::new);
            let ticket = slot.begin(id);
            (slot.entry.clone(), ticket)
        };
        self.spawn_fetch(ticket);
        entry
    }

    /// Record a fetch outcome. Returns `false` if the ticket was superseded and the
    /// outcome discarded.
    ///
    /// A value moves the entry to fresh and clears the error; a fault moves it to error
    /// and keeps the last good value.
    pub fn commit(&self, ticket: &FetchTicket, outcome: Result<ResourceValue>) -> bool {
        let mut slots = self.inner.slots.lock();
        let Some(slot) = slots.get_mut(&ticket.id) else {
            return false;
        };

        if ticket.generation != slot.latest {
            tracing::debug!(
                resource = %ticket.id,
                generation = ticket.generation,
                latest = slot.latest,
                "Discarding superseded fetch outcome"
            );
            return false;
        }

        match outcome {
            Ok(value) => {
                slot.entry.value = Some(value);
                slot.entry.status = EntryStatus::Fresh;
                slot.entry.error = None;
                slot.entry.last_fetched_at = Some(Utc::now());
            }
            Err(err) => {
                tracing::warn!(resource = %ticket.id, error = %err, "Fetch failed, keeping last value");
                slot.entry.status = EntryStatus::Error;
                slot.entry.error = Some(err);
            }
        }
        slot.publish();
        true
    }

    /// Receiver of every published state of `id`, creating the slot if needed
    pub fn watch(&self, id: &ResourceId) -> watch::Receiver<CacheEntry> {
        let mut slots = self.inner.slots.lock();
        slots.entry(id.clone()).or_insert_with(Slot::new).tx.subscribe()
    }

    /// Read and wait for the outcome.
    ///
    /// Triggers a fetch exactly like [`read`](Self::read), then waits until the entry is no
    /// longer loading. Concurrent callers share one request.
    pub async fn fetch(&self, id: &ResourceId) -> Result<ResourceValue> {
        let mut rx = self.watch(id);
        self.read(id);

        let entry = rx
            .wait_for(|entry| entry.status != EntryStatus::Loading)
            .await
            .map_err(|_| SyncError::Config("cache store closed".to_string()))?
            .clone();

        match (entry.status, entry.value, entry.error) {
            (EntryStatus::Error, _, Some(err)) => Err(err),
            (_, Some(value), _) => Ok(value),
            (status, None, _) => Err(SyncError::Config(format!(
                "{} settled as {:?} without a value",
                id, status
            ))),
        }
    }

    /// Every identity cached for a logical resource
    pub fn ids_for(&self, key: ResourceKey) -> Vec<ResourceId> {
        let slots = self.inner.slots.lock();
        let mut ids: Vec<ResourceId> = slots.keys().filter(|id| id.key() == key).cloned().collect();
        ids.sort();
        ids
    }

    /// Every identity currently cached
    pub fn ids(&self) -> Vec<ResourceId> {
        let slots = self.inner.slots.lock();
        let mut ids: Vec<ResourceId> = slots.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let store = self.clone();
        let transport = Arc::clone(&self.inner.transport);

        spawn_tracked("resource_fetch", async move {
            let start = Instant::now();
            let descriptor = ticket.id.descriptor();
            let outcome = match transport.send(ticket.id.request()).await {
                Ok(response) => policy::resolve(descriptor, response),
                Err(err) => Err(err),
            };
            let ok = outcome.is_ok();
            let applied = store.commit(&ticket, outcome);

            tracing::debug!(
                resource = %ticket.id,
                generation = ticket.generation,
                ok,
                applied,
                duration_ms = start.elapsed().as_millis(),
                "Fetch finished"
            );
        });
    }
}
