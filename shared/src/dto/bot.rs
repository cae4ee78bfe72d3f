use serde::{Deserialize, Serialize};

/// Trading bot configuration (`GET bot/get`, echoed by `bot/update` and `bot/toggle`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotSettings {
    pub is_active: bool,
    /// Quote-currency amount spent per buy
    pub trade_amount: f64,
    /// Percent drop that triggers a buy
    pub buy_threshold: f64,
    /// Percent gain that triggers a sell
    pub sell_threshold: f64,
    pub max_positions: u32,
}

/// Partial bot settings update (`POST bot/update`). Unset fields are left unchanged server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BotSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_positions: Option<u32>,
}

impl BotSettingsUpdate {
    /// True when no field would be changed
    pub fn is_empty(&self) -> bool {
        self.trade_amount.is_none()
            && self.buy_threshold.is_none()
            && self.sell_threshold.is_none()
            && self.max_positions.is_none()
    }

    /// Apply this update on top of existing settings
    pub fn apply_to(&self, settings: &mut BotSettings) {
        if let Some(v) = self.trade_amount {
            settings.trade_amount = v;
        }
        if let Some(v) = self.buy_threshold {
            settings.buy_threshold = v;
        }
        if let Some(v) = self.sell_threshold {
            settings.sell_threshold = v;
        }
        if let Some(v) = self.max_positions {
            settings.max_positions = v;
        }
    }
}
