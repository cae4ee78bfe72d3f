//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the paper-trading dashboard client and the
//! account server. All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::market`]**: Public market prices
//!   - **[`dto::portfolio`]**: Paper portfolio and transaction history
//!   - **[`dto::bot`]**: Trading bot settings and partial updates
//!   - **[`dto::coins`]**: Tradeable coin catalogue, enabled set and per-coin prices
//! - **[`utils`]**: Display formatting helpers
//!
//! ## Wire Format
//!
//! - Field names are **snake_case** in Rust and JSON
//! - Optional fields are omitted from JSON when `None`
//! - Deserialization is strict about required fields: a payload missing one is rejected,
//!   which is what the client treats as a schema violation
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::portfolio::Portfolio;
//!
//! let body = r#"{"balance":10000.0,"quote_currency":"USDT","holdings":[],"total_value":10000.0}"#;
//! let portfolio: Portfolio = serde_json::from_str(body).unwrap();
//! assert_eq!(portfolio.balance, 10000.0);
//! ```

pub mod dto;
pub mod utils;

// Wildcard re-exports: shared is a DTO library where all exports are public API
pub use dto::*;
pub use utils::*;
