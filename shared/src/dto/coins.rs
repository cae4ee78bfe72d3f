use serde::{Deserialize, Serialize};

/// A coin the bot can be allowed to trade (`GET coins/available`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coin {
    pub symbol: String,
    pub name: String,
}

/// Price and account balance for one enabled coin (`GET coins/prices`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinPrice {
    pub symbol: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

/// Body of `POST coins/enable` and `POST coins/disable`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoinToggleRequest {
    pub symbol: String,
}
