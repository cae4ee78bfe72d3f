//! # Resource Synchronization
//!
//! Keeps named remote resources consistent with the account server.
//!
//! - [`registry`] - static descriptor table: resource paths, poll intervals, validators,
//!   and the invalidation edges of every mutation
//! - [`policy`] - per-resource handling of unauthenticated responses
//! - [`cache`] - the cache store: one entry per resource identity, coalesced fetches,
//!   last-request-wins commits
//! - [`poller`] - subscription-counted refresh loops
//! - [`mutator`] - writes and their declared invalidations
//! - [`binding`] - the subscription handle consumers hold

pub mod binding;
pub mod cache;
pub mod mutator;
pub mod policy;
pub mod poller;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::Subscription;
pub use cache::{CacheEntry, CacheStore, EntryStatus, FetchTicket};
pub use mutator::Mutator;
pub use policy::AuthPolicy;
pub use poller::{PollGuard, Poller};
pub use registry::{MutationKey, ResourceId, ResourceKey, ResourceValue};
