//! Scripted in-memory transport for unit tests.

use crate::core::error::{Result, SyncError};
use crate::core::service::{ApiRequest, ApiResponse, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

enum Scripted {
    Ready(Result<ApiResponse>),
    Held(oneshot::Receiver<Result<ApiResponse>>),
}

/// Per-path response script.
///
/// Queued responses (`enqueue`, `fail`, `hold`) are consumed in order; once a path's
/// queue is empty the sticky `respond` value is returned, or a 404 if none is set.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sticky: Mutex<HashMap<String, ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

/// Releases one held response
pub(crate) struct Gate {
    tx: oneshot::Sender<Result<ApiResponse>>,
}

impl Gate {
    pub(crate) fn release(self, response: ApiResponse) {
        let _ = self.tx.send(Ok(response));
    }

    pub(crate) fn fail(self, err: SyncError) {
        let _ = self.tx.send(Err(err));
    }
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Default response for every call to `path` once its queue is drained
    pub(crate) fn respond(&self, path: &str, response: ApiResponse) {
        self.sticky.lock().insert(path.to_string(), response);
    }

    /// One-shot response for the next unscripted call to `path`
    pub(crate) fn enqueue(&self, path: &str, response: ApiResponse) {
        self.push(path, Scripted::Ready(Ok(response)));
    }

    /// One-shot transport failure
    pub(crate) fn fail(&self, path: &str, err: SyncError) {
        self.push(path, Scripted::Ready(Err(err)));
    }

    /// The next call to `path` waits until the returned gate is released
    pub(crate) fn hold(&self, path: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.push(path, Scripted::Held(rx));
        Gate { tx }
    }

    /// Number of requests sent to `path`
    pub(crate) fn calls(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.queued
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path.clone();
        self.requests.lock().push(request);

        let next = self.queued.lock().get_mut(&path).and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(SyncError::Network("gate dropped".to_string()))),
            None => Ok(self
                .sticky
                .lock()
                .get(&path)
                .cloned()
                .unwrap_or_else(|| ApiResponse::new(404, serde_json::json!({ "error": "no route" })))),
        }
    }
}

/// Let spawned fetch tasks run to completion on the current-thread test runtime
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
