//! # HTTP Transport
//!
//! reqwest-backed [`Transport`] for the account API.

use crate::config::{SyncConfig, SESSION_COOKIE};
use crate::core::error::{Result, SyncError};
use crate::core::service::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// HTTP client for the account server.
///
/// Credentials are carried by a cookie jar (the session cookie set from config plus
/// anything the server sets), never by bearer headers.
pub struct HttpTransport {
    client: Client,
    config: SyncConfig,
}

impl HttpTransport {
    /// Create a transport for the configured base URL
    pub fn new(config: &SyncConfig) -> Result<Self> {
        config.validate()?;

        let base = Url::parse(&config.api_base_url)
            .map_err(|e| SyncError::Config(format!("invalid API base URL: {}", e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(session) = &config.session {
            jar.add_cookie_str(&format!("{}={}; Path=/", SESSION_COOKIE, session), &base);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .cookie_provider(jar)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let start = Instant::now();
        let url = self.config.url_for(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, url = %url, "Request network error");
            SyncError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, url = %url, status, "Response body read error");
            SyncError::Network(e.to_string())
        })?;

        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        tracing::debug!(
            status,
            duration_ms = start.elapsed().as_millis(),
            "Request completed"
        );

        Ok(ApiResponse::new(status, body))
    }
}
