//! # Core Abstractions
//!
//! - **[`error`]**: fault taxonomy (`SyncError`, `Result<T>`)
//! - **[`service`]**: the `Transport` trait every network call goes through
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dashboard::core::service::Transport;
//! use dashboard::services::api::HttpTransport;
//! use dashboard::config::SyncConfig;
//!
//! // In production: the reqwest-backed transport
//! let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&SyncConfig::from_env()).unwrap());
//! ```

pub mod error;
pub mod service;

pub use error::{Result, SyncError};
pub use service::{ApiRequest, ApiResponse, Method, Transport};
