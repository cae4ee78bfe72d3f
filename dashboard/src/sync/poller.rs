//! # Poller
//!
//! Per-identity refresh loops tied to subscription counts.
//!
//! A poll loop exists for an identity iff it has at least one subscriber and its
//! descriptor declares a poll interval. The loop is an explicit task whose handle is
//! aborted when the last subscriber leaves; a later subscriber starts a new loop whose
//! first tick is one full interval away, so there is no catch-up burst.
//!
//! Each tick runs `invalidate` then `read` on the cache store. A fetch already in flight
//! absorbs the tick (the read attaches to it), and a failed fetch is simply retried on
//! the next tick.

use crate::debug::task_tracker::spawn_tracked;
use crate::sync::cache::CacheStore;
use crate::sync::registry::ResourceId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

struct PollSlot {
    subscribers: usize,
    task: Option<JoinHandle<()>>,
}

/// Subscription-counted poll scheduler. Cloning shares the same registry.
#[derive(Clone)]
pub struct Poller {
    store: CacheStore,
    slots: Arc<Mutex<HashMap<ResourceId, PollSlot>>>,
}

impl Poller {
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register one subscriber of `id`. Polling stops when every returned guard is dropped.
    pub fn subscribe(&self, id: &ResourceId) -> PollGuard {
        let mut slots = self.slots.lock();
        let slot = slots.entry(id.clone()).or_insert(PollSlot {
            subscribers: 0,
            task: None,
        });
        slot.subscribers += 1;

        if slot.task.is_none() {
            if let Some(period) = id.descriptor().poll_interval {
                tracing::debug!(resource = %id, period_ms = period.as_millis(), "Starting poll loop");
                slot.task = Some(self.spawn_loop(id.clone(), period));
            }
        }

        PollGuard {
            poller: self.clone(),
            id: id.clone(),
        }
    }

    pub fn subscriber_count(&self, id: &ResourceId) -> usize {
        self.slots.lock().get(id).map_or(0, |slot| slot.subscribers)
    }

    pub fn is_polling(&self, id: &ResourceId) -> bool {
        self.slots
            .lock()
            .get(id)
            .is_some_and(|slot| slot.task.is_some())
    }

    fn release(&self, id: &ResourceId) {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(id) else {
            return;
        };
        slot.subscribers = slot.subscribers.saturating_sub(1);
        if slot.subscribers == 0 {
            if let Some(task) = slot.task.take() {
                tracing::debug!(resource = %id, "Stopping poll loop");
                // Only the loop is cancelled; a fetch it already started runs to commit
                task.abort();
            }
            slots.remove(id);
        }
    }

    fn spawn_loop(&self, id: ResourceId, period: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        spawn_tracked("poll", async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.invalidate(&id);
                let entry = store.read(&id);
                tracing::trace!(resource = %id, status = ?entry.status, "Poll tick");
            }
        })
    }
}

/// Keeps one subscription alive; dropping it unsubscribes
pub struct PollGuard {
    poller: Poller,
    id: ResourceId,
}

impl PollGuard {
    pub fn id(&self) -> &ResourceId {
        &self.id
    }
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.poller.release(&self.id);
    }
}
