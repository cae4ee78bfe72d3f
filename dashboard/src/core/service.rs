//! # Service Traits
//!
//! The transport seam between the synchronization layer and the network.
//!
//! The cache store, poller and mutator only ever talk to a `dyn Transport`, so tests
//! inject a scripted in-memory implementation while production uses
//! [`HttpTransport`](crate::services::api::HttpTransport).

use crate::core::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use shared::dto::ErrorResponse;
use std::fmt;

/// HTTP method of a resource or mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A request against the account API, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Logical path such as `portfolio/get`, without leading slash
    pub path: String,
    pub query: Vec<(String, String)>,
    /// JSON body, sent as `application/json`
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// A response that reached the client. Status interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when empty, `Value::String` when not JSON
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.status == 401
    }

    /// Best-effort human message for a failed response
    pub fn error_message(&self) -> String {
        if let Ok(ErrorResponse { error }) = ErrorResponse::deserialize(&self.body) {
            return error;
        }
        match &self.body {
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {}", self.status)),
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            _ => format!("status {}", self.status),
        }
    }
}

/// Sends requests to the account server.
///
/// Implementations return `Err` only for transport failures ([`SyncError::Network`]);
/// any response that arrived, whatever its status, is `Ok`.
///
/// [`SyncError::Network`]: crate::core::error::SyncError::Network
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
