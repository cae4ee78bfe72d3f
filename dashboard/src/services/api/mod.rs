//! # Account API Client Module
//!
//! ```text
//! api/
//! ├── mod.rs      - Module exports
//! └── client.rs   - HttpTransport (reqwest, cookie credentials)
//! ```

pub mod client;

pub use client::HttpTransport;
