use serde::{Deserialize, Serialize};

/// One row of the public market price feed (`GET market/prices`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketPrice {
    pub symbol: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
}
