//! Diagnostic hook for outbound fetches
//!
//! Every fetch reports the request URL, the status code and the raw body
//! before it branches on the status. The default hook emits a `tracing`
//! event; tests swap in [`RecordingTrace`] to assert on the calls.

use std::sync::{Arc, Mutex};

use tracing::debug;

/// Receives one call per completed (or failed) HTTP request
pub trait FetchTrace: Send + Sync {
    /// `status` is `None` when the request never produced a response
    fn on_response(&self, url: &str, status: Option<u16>, body: &str);
}

/// Default hook: a `debug` event on the `scorecard_github` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTrace;

impl FetchTrace for TracingTrace {
    fn on_response(&self, url: &str, status: Option<u16>, body: &str) {
        debug!(url, ?status, response = body, "Fetched");
    }
}

/// A single recorded fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedFetch {
    pub url: String,
    pub status: Option<u16>,
    pub body: String,
}

/// Hook that keeps every call in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingTrace {
    calls: Arc<Mutex<Vec<TracedFetch>>>,
}

impl RecordingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls recorded so far
    pub fn calls(&self) -> Vec<TracedFetch> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl FetchTrace for RecordingTrace {
    fn on_response(&self, url: &str, status: Option<u16>, body: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(TracedFetch {
                url: url.to_string(),
                status,
                body: body.to_string(),
            });
        }
    }
}
