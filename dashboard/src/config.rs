//! Client configuration from environment variables

use crate::core::error::{Result, SyncError};

/// Default base URL of the account API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3001/api";

/// Name of the session cookie the account server issues at login
pub const SESSION_COOKIE: &str = "session";

/// Synchronization layer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Base URL every logical resource path is joined onto, without trailing slash
    pub api_base_url: String,
    /// Session cookie value sent with every request, if logged in
    pub session: Option<String>,
    /// Transport timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            session: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// - `DASHBOARD_API_URL`: base URL (default `http://127.0.0.1:3001/api`)
    /// - `DASHBOARD_SESSION`: session cookie value
    /// - `DASHBOARD_TIMEOUT_MS`: transport timeout (default 10000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("DASHBOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session: lookup("DASHBOARD_SESSION").filter(|v| !v.trim().is_empty()),
            request_timeout_ms: lookup("DASHBOARD_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }

    /// Builder-style override of the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style override of the session cookie
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Reject configurations the transport cannot work with
    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(SyncError::Config("API base URL is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "API base URL must be http(s): {}",
                url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(SyncError::Config("request timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Full URL for a logical resource path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}
