//! # Common Error Types
//!
//! Fault taxonomy for the resource synchronization layer.
//!
//! ## Error Categories
//!
//! - **Network**: the request never produced a response (connection refused, DNS, timeout)
//! - **Http**: a non-2xx response that is not resolved by the resource's auth policy
//! - **SchemaViolation**: a response body that failed validation against the resource's schema
//! - **Unauthenticated**: a 401 surfaced from a mutation. Fetches resolve 401 through
//!   [`AuthPolicy`](crate::sync::policy::AuthPolicy) into either an absence value or an `Http` fault
//! - **InvalidRequest**: a mutation payload rejected locally, nothing was sent
//! - **Config**: invalid client configuration or resource identity
//!
//! ## Usage Pattern
//!
//! ```rust
//! use dashboard::core::error::SyncError;
//!
//! let err = SyncError::SchemaViolation {
//!     resource: "coin prices",
//!     detail: "missing field `price`".to_string(),
//! };
//! assert_eq!(err.to_string(), "Schema violation in coin prices: missing field `price`");
//! ```

use thiserror::Error;

/// Every fault the synchronization layer can record or return.
///
/// `Clone` because a committed fault is kept in the cache entry for diagnostics
/// while the same fault is also handed to any awaiting caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// Transport-level failure, no response received
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx status other than a resource's soft-401 case
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response failed validation against the declared schema
    #[error("Schema violation in {resource}: {detail}")]
    SchemaViolation {
        resource: &'static str,
        detail: String,
    },

    /// Mutation rejected because the session is not logged in
    #[error("Not authenticated for {resource}")]
    Unauthenticated { resource: &'static str },

    /// Mutation payload rejected before sending
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration or resource identity error
    #[error("Config error: {0}")]
    Config(String),
}

impl SyncError {
    /// True for faults caused by a missing or expired session
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            SyncError::Unauthenticated { .. } | SyncError::Http { status: 401, .. }
        )
    }

    /// HTTP status carried by the fault, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Http { status, .. } => Some(*status),
            SyncError::Unauthenticated { .. } => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network(err.to_string())
    }
}

/// Convenience type alias for `Result<T, SyncError>`.
pub type Result<T> = std::result::Result<T, SyncError>;
