//! # Mutator
//!
//! State-changing requests. A successful write invalidates exactly the resources its
//! registry entry declares; a failed write touches no cache and is returned to the caller.

use crate::core::error::{Result, SyncError};
use crate::core::service::{ApiRequest, Transport};
use crate::notifications::{Notice, Notifier};
use crate::sync::cache::CacheStore;
use crate::sync::registry::{MutationDescriptor, MutationKey};
use serde::de::DeserializeOwned;
use shared::dto::{BotSettings, BotSettingsUpdate, CoinToggleRequest, MutationAck, Portfolio};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Executes mutations against the account server. Cloning shares the same store.
#[derive(Clone)]
pub struct Mutator {
    store: CacheStore,
    transport: Arc<dyn Transport>,
    notifier: Notifier,
}

impl Mutator {
    pub fn new(store: CacheStore, transport: Arc<dyn Transport>, notifier: Notifier) -> Self {
        Self {
            store,
            transport,
            notifier,
        }
    }

    /// Reset the paper account to its starting balance.
    ///
    /// Invalidates: portfolio, transactions.
    pub async fn reset_portfolio(&self) -> Result<Portfolio> {
        let portfolio: Portfolio = self.execute(MutationKey::ResetPortfolio, None).await?;
        self.notifier.publish(Notice::portfolio_reset());
        Ok(portfolio)
    }

    /// Change bot parameters. Unset fields are left unchanged.
    ///
    /// Invalidates: bot settings, portfolio.
    pub async fn update_bot_settings(&self, update: BotSettingsUpdate) -> Result<BotSettings> {
        self.checked(MutationKey::UpdateBotSettings, validate_bot_update(&update))?;
        let body = serde_json::to_value(&update)
            .map_err(|e| SyncError::InvalidRequest(e.to_string()))?;
        let settings: BotSettings = self
            .execute(MutationKey::UpdateBotSettings, Some(body))
            .await?;
        self.notifier.publish(Notice::bot_updated());
        Ok(settings)
    }

    /// Flip the bot between running and stopped.
    ///
    /// Invalidates: bot settings.
    pub async fn toggle_bot(&self) -> Result<BotSettings> {
        let settings: BotSettings = self.execute(MutationKey::ToggleBot, None).await?;
        self.notifier.publish(Notice::bot_toggled(settings.is_active));
        Ok(settings)
    }

    /// Allow the bot to trade `symbol`.
    ///
    /// Invalidates: enabled coins, coin prices.
    pub async fn enable_coin(&self, symbol: &str) -> Result<MutationAck> {
        let symbol = self.checked(MutationKey::EnableCoin, normalize_symbol(symbol))?;
        let ack: MutationAck = self
            .execute(MutationKey::EnableCoin, Some(coin_body(&symbol)?))
            .await?;
        self.notifier.publish(Notice::coin_enabled(&symbol));
        Ok(ack)
    }

    /// Stop the bot from trading `symbol`.
    ///
    /// Invalidates: enabled coins.
    pub async fn disable_coin(&self, symbol: &str) -> Result<MutationAck> {
        let symbol = self.checked(MutationKey::DisableCoin, normalize_symbol(symbol))?;
        let ack: MutationAck = self
            .execute(MutationKey::DisableCoin, Some(coin_body(&symbol)?))
            .await?;
        self.notifier.publish(Notice::coin_disabled(&symbol));
        Ok(ack)
    }

    /// Report a local validation failure the same way as a remote one
    fn checked<T>(&self, key: MutationKey, result: Result<T>) -> Result<T> {
        result.inspect_err(|err| {
            self.notifier
                .publish(Notice::mutation_failed(key.descriptor().name, err));
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        key: MutationKey,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let descriptor = key.descriptor();
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "mutation",
            mutation = descriptor.name,
            path = descriptor.path,
            request_id = %request_id
        );

        async {
            let start = Instant::now();
            match self.send(descriptor, body).await {
                Ok(value) => {
                    let touched: usize = descriptor
                        .invalidates
                        .iter()
                        .map(|&resource| self.store.invalidate_after_write(resource))
                        .sum();
                    tracing::info!(
                        duration_ms = start.elapsed().as_millis(),
                        invalidated = touched,
                        "Mutation succeeded"
                    );
                    Ok(value)
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        duration_ms = start.elapsed().as_millis(),
                        "Mutation failed, caches untouched"
                    );
                    self.notifier
                        .publish(Notice::mutation_failed(descriptor.name, &err));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        descriptor: &'static MutationDescriptor,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let request = ApiRequest {
            method: descriptor.method,
            ..ApiRequest::post(descriptor.path, body)
        };
        let response = self.transport.send(request).await?;

        if response.is_unauthenticated() {
            return Err(SyncError::Unauthenticated {
                resource: descriptor.name,
            });
        }
        if !response.is_success() {
            return Err(SyncError::Http {
                status: response.status,
                message: response.error_message(),
            });
        }

        serde_json::from_value(response.body).map_err(|e| SyncError::SchemaViolation {
            resource: descriptor.name,
            detail: e.to_string(),
        })
    }
}

fn coin_body(symbol: &str) -> Result<serde_json::Value> {
    serde_json::to_value(CoinToggleRequest {
        symbol: symbol.to_string(),
    })
    .map_err(|e| SyncError::InvalidRequest(e.to_string()))
}

/// Uppercased symbol, or an error if it is empty or not ASCII alphanumeric
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(SyncError::InvalidRequest("coin symbol is empty".to_string()));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SyncError::InvalidRequest(format!(
            "invalid coin symbol: {}",
            symbol
        )));
    }
    Ok(symbol.to_ascii_uppercase())
}

fn validate_bot_update(update: &BotSettingsUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(SyncError::InvalidRequest(
            "bot update changes nothing".to_string(),
        ));
    }
    let numbers = [
        ("trade_amount", update.trade_amount),
        ("buy_threshold", update.buy_threshold),
        ("sell_threshold", update.sell_threshold),
    ];
    for (field, value) in numbers {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(SyncError::InvalidRequest(format!(
                    "{} must be a non-negative number",
                    field
                )));
            }
        }
    }
    Ok(())
}
