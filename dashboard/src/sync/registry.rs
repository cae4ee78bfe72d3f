//! # Resource Descriptor Table
//!
//! Static registry of every remote resource and mutation the dashboard knows about.
//!
//! Nothing reaches the cache store or the mutator except through this table: a
//! [`ResourceId`] can only be built from a [`ResourceKey`], and invalidation edges are
//! declared as `ResourceKey`s, so a misspelled path cannot silently break invalidation.
//!
//! | Resource        | Path              | Poll     | Unauthenticated      |
//! |-----------------|-------------------|----------|----------------------|
//! | market prices   | `market/prices`   | 3 s      | hard                 |
//! | portfolio       | `portfolio/get`   | 5 s      | soft, null           |
//! | transactions    | `transactions/list` | 5 s    | soft, null           |
//! | bot settings    | `bot/get`         | none     | soft, null           |
//! | available coins | `coins/available` | none     | hard                 |
//! | enabled coins   | `coins/enabled`   | none     | soft, empty list     |
//! | coin prices     | `coins/prices`    | 10 s     | soft, empty list     |

use crate::core::error::{Result, SyncError};
use crate::core::service::{ApiRequest, Method};
use crate::sync::policy::AuthPolicy;
use serde::de::DeserializeOwned;
use shared::dto::{BotSettings, Coin, CoinPrice, MarketPrice, Portfolio, Transaction};
use std::fmt;
use std::time::Duration;

/// Logical name of a remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    MarketPrices,
    Portfolio,
    Transactions,
    BotSettings,
    AvailableCoins,
    EnabledCoins,
    /// Per-coin price and balance for the enabled set ("coin balances")
    CoinPrices,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 7] = [
        ResourceKey::MarketPrices,
        ResourceKey::Portfolio,
        ResourceKey::Transactions,
        ResourceKey::BotSettings,
        ResourceKey::AvailableCoins,
        ResourceKey::EnabledCoins,
        ResourceKey::CoinPrices,
    ];

    /// Registered descriptor. The match is exhaustive, so a new key cannot compile
    /// without a descriptor.
    pub fn descriptor(self) -> &'static ResourceDescriptor {
        match self {
            ResourceKey::MarketPrices => &MARKET_PRICES,
            ResourceKey::Portfolio => &PORTFOLIO,
            ResourceKey::Transactions => &TRANSACTIONS,
            ResourceKey::BotSettings => &BOT_SETTINGS,
            ResourceKey::AvailableCoins => &AVAILABLE_COINS,
            ResourceKey::EnabledCoins => &ENABLED_COINS,
            ResourceKey::CoinPrices => &COIN_PRICES,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to retrieve and validate one resource
pub struct ResourceDescriptor {
    pub key: ResourceKey,
    pub name: &'static str,
    pub path: &'static str,
    pub method: Method,
    /// `None` means fetch-once, refreshed only by invalidation
    pub poll_interval: Option<Duration>,
    pub auth: AuthPolicy,
    /// Query parameter a sub-key is sent as, if the resource supports sub-keys
    pub key_param: Option<&'static str>,
    decode: fn(serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error>,
}

impl ResourceDescriptor {
    /// Validate a response body against this resource's schema
    pub fn validate(&self, body: serde_json::Value) -> Result<ResourceValue> {
        (self.decode)(body).map_err(|e| SyncError::SchemaViolation {
            resource: self.name,
            detail: e.to_string(),
        })
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("poll_interval", &self.poll_interval)
            .field("auth", &self.auth)
            .finish()
    }
}

static MARKET_PRICES: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::MarketPrices,
    name: "market prices",
    path: "market/prices",
    method: Method::Get,
    poll_interval: Some(Duration::from_millis(3000)),
    auth: AuthPolicy::Hard,
    key_param: None,
    decode: decode_market_prices,
};

static PORTFOLIO: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::Portfolio,
    name: "portfolio",
    path: "portfolio/get",
    method: Method::Get,
    poll_interval: Some(Duration::from_millis(5000)),
    auth: AuthPolicy::Soft,
    key_param: None,
    decode: decode_portfolio,
};

static TRANSACTIONS: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::Transactions,
    name: "transactions",
    path: "transactions/list",
    method: Method::Get,
    poll_interval: Some(Duration::from_millis(5000)),
    auth: AuthPolicy::Soft,
    key_param: None,
    decode: decode_transactions,
};

static BOT_SETTINGS: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::BotSettings,
    name: "bot settings",
    path: "bot/get",
    method: Method::Get,
    poll_interval: None,
    auth: AuthPolicy::Soft,
    key_param: None,
    decode: decode_bot_settings,
};

static AVAILABLE_COINS: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::AvailableCoins,
    name: "available coins",
    path: "coins/available",
    method: Method::Get,
    poll_interval: None,
    auth: AuthPolicy::Hard,
    key_param: None,
    decode: decode_available_coins,
};

static ENABLED_COINS: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::EnabledCoins,
    name: "enabled coins",
    path: "coins/enabled",
    method: Method::Get,
    poll_interval: None,
    auth: AuthPolicy::Soft,
    key_param: None,
    decode: decode_enabled_coins,
};

static COIN_PRICES: ResourceDescriptor = ResourceDescriptor {
    key: ResourceKey::CoinPrices,
    name: "coin prices",
    path: "coins/prices",
    method: Method::Get,
    poll_interval: Some(Duration::from_millis(10_000)),
    auth: AuthPolicy::Soft,
    key_param: Some("symbol"),
    decode: decode_coin_prices,
};

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> std::result::Result<T, serde_json::Error> {
    serde_json::from_value(body)
}

fn decode_market_prices(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::MarketPrices)
}

fn decode_portfolio(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::Portfolio)
}

fn decode_transactions(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::Transactions)
}

fn decode_bot_settings(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::BotSettings)
}

fn decode_available_coins(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::AvailableCoins)
}

fn decode_enabled_coins(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::EnabledCoins)
}

fn decode_coin_prices(body: serde_json::Value) -> std::result::Result<ResourceValue, serde_json::Error> {
    decode(body).map(ResourceValue::CoinPrices)
}

/// A validated payload of one resource.
///
/// Singular resources carry `Option` so a soft-401 can commit `None` (null) as a
/// legitimate value; collection resources commit an empty list instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValue {
    MarketPrices(Vec<MarketPrice>),
    Portfolio(Option<Portfolio>),
    Transactions(Option<Vec<Transaction>>),
    BotSettings(Option<BotSettings>),
    AvailableCoins(Vec<Coin>),
    EnabledCoins(Vec<String>),
    CoinPrices(Vec<CoinPrice>),
}

impl ResourceValue {
    /// The "correctly empty" value committed for an unauthenticated soft-401 response
    pub fn absent(key: ResourceKey) -> Self {
        match key {
            ResourceKey::MarketPrices => ResourceValue::MarketPrices(Vec::new()),
            ResourceKey::Portfolio => ResourceValue::Portfolio(None),
            ResourceKey::Transactions => ResourceValue::Transactions(None),
            ResourceKey::BotSettings => ResourceValue::BotSettings(None),
            ResourceKey::AvailableCoins => ResourceValue::AvailableCoins(Vec::new()),
            ResourceKey::EnabledCoins => ResourceValue::EnabledCoins(Vec::new()),
            ResourceKey::CoinPrices => ResourceValue::CoinPrices(Vec::new()),
        }
    }

    pub fn key(&self) -> ResourceKey {
        match self {
            ResourceValue::MarketPrices(_) => ResourceKey::MarketPrices,
            ResourceValue::Portfolio(_) => ResourceKey::Portfolio,
            ResourceValue::Transactions(_) => ResourceKey::Transactions,
            ResourceValue::BotSettings(_) => ResourceKey::BotSettings,
            ResourceValue::AvailableCoins(_) => ResourceKey::AvailableCoins,
            ResourceValue::EnabledCoins(_) => ResourceKey::EnabledCoins,
            ResourceValue::CoinPrices(_) => ResourceKey::CoinPrices,
        }
    }

    /// True for null singular values and empty collections
    pub fn is_absent(&self) -> bool {
        match self {
            ResourceValue::MarketPrices(v) => v.is_empty(),
            ResourceValue::Portfolio(v) => v.is_none(),
            ResourceValue::Transactions(v) => v.is_none(),
            ResourceValue::BotSettings(v) => v.is_none(),
            ResourceValue::AvailableCoins(v) => v.is_empty(),
            ResourceValue::EnabledCoins(v) => v.is_empty(),
            ResourceValue::CoinPrices(v) => v.is_empty(),
        }
    }

    pub fn as_market_prices(&self) -> Option<&[MarketPrice]> {
        match self {
            ResourceValue::MarketPrices(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_portfolio(&self) -> Option<&Portfolio> {
        match self {
            ResourceValue::Portfolio(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn as_transactions(&self) -> Option<&[Transaction]> {
        match self {
            ResourceValue::Transactions(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_bot_settings(&self) -> Option<&BotSettings> {
        match self {
            ResourceValue::BotSettings(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn as_available_coins(&self) -> Option<&[Coin]> {
        match self {
            ResourceValue::AvailableCoins(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enabled_coins(&self) -> Option<&[String]> {
        match self {
            ResourceValue::EnabledCoins(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_coin_prices(&self) -> Option<&[CoinPrice]> {
        match self {
            ResourceValue::CoinPrices(v) => Some(v),
            _ => None,
        }
    }
}

/// Identity of one cache slot: logical resource, its path, and an optional sub-key.
///
/// Equality and hashing are structural. Only constructible through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    key: ResourceKey,
    path: &'static str,
    sub_key: Option<String>,
}

impl ResourceId {
    /// The unkeyed identity of a resource
    pub fn of(key: ResourceKey) -> Self {
        Self {
            key,
            path: key.descriptor().path,
            sub_key: None,
        }
    }

    /// A sub-keyed identity, e.g. coin prices for one symbol
    pub fn keyed(key: ResourceKey, sub_key: impl Into<String>) -> Result<Self> {
        let descriptor = key.descriptor();
        let sub_key = sub_key.into();
        if descriptor.key_param.is_none() {
            return Err(SyncError::Config(format!(
                "{} does not support sub-keys",
                descriptor.name
            )));
        }
        if sub_key.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "empty sub-key for {}",
                descriptor.name
            )));
        }
        Ok(Self {
            key,
            path: descriptor.path,
            sub_key: Some(sub_key),
        })
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn sub_key(&self) -> Option<&str> {
        self.sub_key.as_deref()
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.key.descriptor()
    }

    /// The retrieval request for this identity
    pub fn request(&self) -> ApiRequest {
        let descriptor = self.descriptor();
        let mut request = ApiRequest {
            method: descriptor.method,
            ..ApiRequest::get(self.path)
        };
        if let (Some(param), Some(sub_key)) = (descriptor.key_param, &self.sub_key) {
            request = request.with_query(param, sub_key.clone());
        }
        request
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_key {
            Some(sub_key) => write!(f, "{}[{}]", self.path, sub_key),
            None => f.write_str(self.path),
        }
    }
}

/// State-changing operations against the account server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKey {
    ResetPortfolio,
    UpdateBotSettings,
    ToggleBot,
    EnableCoin,
    DisableCoin,
}

impl MutationKey {
    pub const ALL: [MutationKey; 5] = [
        MutationKey::ResetPortfolio,
        MutationKey::UpdateBotSettings,
        MutationKey::ToggleBot,
        MutationKey::EnableCoin,
        MutationKey::DisableCoin,
    ];

    pub fn descriptor(self) -> &'static MutationDescriptor {
        match self {
            MutationKey::ResetPortfolio => &RESET_PORTFOLIO,
            MutationKey::UpdateBotSettings => &UPDATE_BOT_SETTINGS,
            MutationKey::ToggleBot => &TOGGLE_BOT,
            MutationKey::EnableCoin => &ENABLE_COIN,
            MutationKey::DisableCoin => &DISABLE_COIN,
        }
    }
}

/// A mutation endpoint and its invalidation edge set
#[derive(Debug)]
pub struct MutationDescriptor {
    pub key: MutationKey,
    pub name: &'static str,
    pub path: &'static str,
    pub method: Method,
    /// Resources this mutation may have changed. Fixed at registration.
    pub invalidates: &'static [ResourceKey],
}

static RESET_PORTFOLIO: MutationDescriptor = MutationDescriptor {
    key: MutationKey::ResetPortfolio,
    name: "reset portfolio",
    path: "portfolio/reset",
    method: Method::Post,
    invalidates: &[ResourceKey::Portfolio, ResourceKey::Transactions],
};

static UPDATE_BOT_SETTINGS: MutationDescriptor = MutationDescriptor {
    key: MutationKey::UpdateBotSettings,
    name: "update bot settings",
    path: "bot/update",
    method: Method::Post,
    invalidates: &[ResourceKey::BotSettings, ResourceKey::Portfolio],
};

static TOGGLE_BOT: MutationDescriptor = MutationDescriptor {
    key: MutationKey::ToggleBot,
    name: "toggle bot",
    path: "bot/toggle",
    method: Method::Post,
    invalidates: &[ResourceKey::BotSettings],
};

static ENABLE_COIN: MutationDescriptor = MutationDescriptor {
    key: MutationKey::EnableCoin,
    name: "enable coin",
    path: "coins/enable",
    method: Method::Post,
    invalidates: &[ResourceKey::EnabledCoins, ResourceKey::CoinPrices],
};

static DISABLE_COIN: MutationDescriptor = MutationDescriptor {
    key: MutationKey::DisableCoin,
    name: "disable coin",
    path: "coins/disable",
    method: Method::Post,
    invalidates: &[ResourceKey::EnabledCoins],
};
