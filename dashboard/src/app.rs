//! # Dashboard
//!
//! [`Dashboard`] wires one cache store to its poller, mutator and notice queue. Each
//! instance owns a fresh store; nothing is global, so tests and multiple accounts can
//! run side by side.
//!
//! ```text
//!  Subscription ──subscribe──▶ Poller ──invalidate/read──▶ CacheStore ──spawn──▶ Transport
//!       ▲                                                     │  ▲
//!       └──────────────────── watch channel ◀─────────────────┘  │
//!  Mutator ──POST──▶ Transport, then invalidate_after_write ─────┘
//!     └──▶ Notifier ──▶ presentation
//! ```

use crate::config::SyncConfig;
use crate::core::error::{Result, SyncError};
use crate::core::service::Transport;
use crate::notifications::{Notice, Notifier};
use crate::services::api::HttpTransport;
use crate::sync::binding::Subscription;
use crate::sync::cache::{CacheStore, EntryStatus};
use crate::sync::mutator::Mutator;
use crate::sync::poller::Poller;
use crate::sync::registry::{ResourceId, ResourceKey, ResourceValue};
use futures::future::join_all;
use shared::dto::{BotSettings, Coin, CoinPrice, MarketPrice, Portfolio, Transaction};
use std::sync::Arc;

/// The synchronization layer for one account session
#[derive(Clone)]
pub struct Dashboard {
    store: CacheStore,
    poller: Poller,
    mutator: Mutator,
    notifier: Notifier,
}

impl Dashboard {
    /// Dashboard talking HTTP to the configured account server
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        tracing::info!(api = %config.api_base_url, session = config.session.is_some(), "Dashboard created");
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        let store = CacheStore::new(Arc::clone(&transport));
        let notifier = Notifier::new();
        Self {
            poller: Poller::new(store.clone()),
            mutator: Mutator::new(store.clone(), transport, notifier.clone()),
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn mutator(&self) -> &Mutator {
        &self.mutator
    }

    /// Mount a consumer of `id`: counts it for polling and triggers the initial read
    pub fn subscribe(&self, id: &ResourceId) -> Subscription {
        Subscription::new(self.store.clone(), id.clone(), self.poller.subscribe(id))
    }

    /// Receiver of mutation notices
    pub fn notices(&self) -> async_channel::Receiver<Notice> {
        self.notifier.receiver()
    }

    /// Fetch every registered resource once and wait for all outcomes
    pub async fn load_all(&self) -> Vec<(ResourceKey, Result<ResourceValue>)> {
        let fetches = ResourceKey::ALL.into_iter().map(|key| async move {
            let outcome = self.store.fetch(&ResourceId::of(key)).await;
            (key, outcome)
        });
        join_all(fetches).await
    }

    /// Current cached values of every unkeyed resource. Never triggers a fetch.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let value = |key: ResourceKey| {
            self.store
                .entry(&ResourceId::of(key))
                .and_then(|entry| entry.value)
        };

        let errors: Vec<(ResourceKey, SyncError)> = ResourceKey::ALL
            .into_iter()
            .filter_map(|key| {
                let entry = self.store.entry(&ResourceId::of(key))?;
                match (entry.status, entry.error) {
                    (EntryStatus::Error, Some(err)) => Some((key, err)),
                    _ => None,
                }
            })
            .collect();

        // Logged out only when the server answered: both account slots settled fresh on
        // their absence value. Failed or missing fetches say nothing about the session.
        let account_keys = [ResourceKey::Portfolio, ResourceKey::BotSettings];
        let logged_out = account_keys.into_iter().all(|key| {
            self.store.entry(&ResourceId::of(key)).is_some_and(|entry| {
                entry.status == EntryStatus::Fresh
                    && entry.value.as_ref().is_some_and(ResourceValue::is_absent)
            })
        }) && !errors.iter().any(|(key, _)| account_keys.contains(key));

        DashboardSnapshot {
            market_prices: value(ResourceKey::MarketPrices)
                .and_then(|v| v.as_market_prices().map(<[_]>::to_vec))
                .unwrap_or_default(),
            portfolio: value(ResourceKey::Portfolio).and_then(|v| v.as_portfolio().cloned()),
            transactions: value(ResourceKey::Transactions)
                .and_then(|v| v.as_transactions().map(<[_]>::to_vec))
                .unwrap_or_default(),
            bot_settings: value(ResourceKey::BotSettings).and_then(|v| v.as_bot_settings().cloned()),
            available_coins: value(ResourceKey::AvailableCoins)
                .and_then(|v| v.as_available_coins().map(<[_]>::to_vec))
                .unwrap_or_default(),
            enabled_coins: value(ResourceKey::EnabledCoins)
                .and_then(|v| v.as_enabled_coins().map(<[_]>::to_vec))
                .unwrap_or_default(),
            coin_prices: value(ResourceKey::CoinPrices)
                .and_then(|v| v.as_coin_prices().map(<[_]>::to_vec))
                .unwrap_or_default(),
            errors,
            logged_out,
        }
    }
}

/// Read-only aggregate of the cached account view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub market_prices: Vec<MarketPrice>,
    /// `None` when logged out or not yet fetched
    pub portfolio: Option<Portfolio>,
    pub transactions: Vec<Transaction>,
    pub bot_settings: Option<BotSettings>,
    pub available_coins: Vec<Coin>,
    pub enabled_coins: Vec<String>,
    pub coin_prices: Vec<CoinPrice>,
    /// Resources whose latest fetch failed
    pub errors: Vec<(ResourceKey, SyncError)>,
    /// The server reported the session as unauthenticated
    pub logged_out: bool,
}

impl DashboardSnapshot {
    /// True only for a soft-401 answer, never for an outage or an unfetched account
    pub fn is_logged_out(&self) -> bool {
        self.logged_out
    }
}
