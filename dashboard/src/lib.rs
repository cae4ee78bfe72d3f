//! # Paper-Trading Dashboard - Resource Synchronization Layer
//!
//! Client-side synchronization for a simulated crypto trading account: live prices,
//! portfolio, transaction history, bot configuration and the tradeable coin set are kept
//! consistent with the account server despite independent polling cadences, concurrent
//! subscribers and writes that change several resources at once.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              dashboard (this crate)                    │
//! ├────────────────────────────────────────────────────────┤
//! │  sync::registry  - descriptor table, invalidation edges│
//! │  sync::cache     - one entry per resource identity     │
//! │  sync::poller    - subscription-counted refresh loops  │
//! │  sync::mutator   - writes + declared invalidations     │
//! │  sync::policy    - soft/hard handling of 401           │
//! │  sync::binding   - consumer subscriptions              │
//! └────────────────────────────────────────────────────────┘
//!          │ HTTP/JSON, session cookie
//!          ▼
//! ┌─────────────────────────┐
//! │  Account API server     │
//! └─────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - **app**: [`Dashboard`] facade wiring store, poller, mutator and notices
//! - **config**: [`SyncConfig`] from environment variables
//! - **core**: error taxonomy and the [`Transport`] seam
//! - **services**: reqwest-backed [`HttpTransport`]
//! - **sync**: the synchronization layer proper
//! - **notifications**: mutation notices for the presentation layer
//! - **debug**: logging setup and tracked task spawning
//!
//! ## Example
//!
//! ```rust,ignore
//! let dashboard = Dashboard::new(&SyncConfig::from_env())?;
//! let mut prices = dashboard.subscribe(&ResourceId::of(ResourceKey::MarketPrices));
//! while let Ok(entry) = prices.changed().await {
//!     render(entry);
//! }
//! ```

pub mod app;
pub mod config;
pub mod core;
pub mod debug;
pub mod notifications;
pub mod services;
pub mod sync;

pub use app::{Dashboard, DashboardSnapshot};
pub use config::SyncConfig;
pub use crate::core::{ApiRequest, ApiResponse, Method, Result, SyncError, Transport};
pub use notifications::{Notice, NoticeLevel, Notifier};
pub use services::api::HttpTransport;
pub use sync::{CacheEntry, EntryStatus, ResourceId, ResourceKey, ResourceValue, Subscription};
