//! # Data Transfer Objects (DTOs)
//!
//! All data structures exchanged with the account server over the REST API.
//!
//! ## Module Organization
//!
//! - [`market`] - Public market price feed
//! - [`portfolio`] - Portfolio, holdings and transactions
//! - [`bot`] - Bot settings
//! - [`coins`] - Coin catalogue, enable/disable requests and coin prices
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /api/coins/enable
//! Content-Type: application/json
//! Cookie: session=...
//!
//! { "symbol": "ETH" }
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! { "success": true, "message": "ETH enabled" }
//! ```

pub mod bot;
pub mod coins;
pub mod market;
pub mod portfolio;

pub use bot::*;
pub use coins::*;
pub use market::*;
pub use portfolio::*;

use serde::{Deserialize, Serialize};

/// Generic acknowledgement returned by mutations that do not echo a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned by the server on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
