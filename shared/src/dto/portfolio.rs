//! Paper portfolio and trade history DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Starting balance of a freshly reset paper account, in the quote currency
pub const STARTING_BALANCE: f64 = 10_000.0;

/// Paper trading portfolio (`GET portfolio/get`, also echoed by `POST portfolio/reset`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Portfolio {
    /// Free cash in the quote currency
    pub balance: f64,
    pub quote_currency: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    /// Cash plus marked-to-market holdings
    pub total_value: f64,
}

impl Portfolio {
    /// A portfolio with no holdings and the starting balance
    pub fn fresh(quote_currency: impl Into<String>) -> Self {
        Self {
            balance: STARTING_BALANCE,
            quote_currency: quote_currency.into(),
            holdings: Vec::new(),
            total_value: STARTING_BALANCE,
        }
    }
}

/// A position in one coin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub amount: f64,
    pub avg_price: f64,
}

/// Direction of an executed trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// One executed paper trade (`GET transactions/list` returns a list of these)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub symbol: String,
    pub side: TradeSide,
    pub amount: f64,
    pub price: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_portfolio_has_starting_balance() {
        let portfolio = Portfolio::fresh("USDT");

        assert_eq!(portfolio.balance, 10_000.0);
        assert_eq!(portfolio.total_value, 10_000.0);
        assert!(portfolio.holdings.is_empty());
    }

    #[test]
    fn test_transaction_side_is_lowercase_on_the_wire() {
        let body = r#"{
            "id": "tx-1",
            "symbol": "BTC",
            "side": "sell",
            "amount": 0.5,
            "price": 60000.0,
            "total": 30000.0,
            "created_at": "2024-05-01T12:00:00Z"
        }"#;

        let tx: Transaction = serde_json::from_str(body).unwrap();

        assert_eq!(tx.side, TradeSide::Sell);
        assert_eq!(serde_json::to_value(tx.side).unwrap(), "sell");
    }

    #[test]
    fn test_portfolio_requires_balance() {
        let body = r#"{"quote_currency":"USDT","holdings":[],"total_value":1.0}"#;
        assert!(serde_json::from_str::<Portfolio>(body).is_err());
    }
}
