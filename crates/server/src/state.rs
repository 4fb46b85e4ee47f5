// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use openclaw_dash_core::Aggregator;

use crate::error::{ApiError, ApiResult};
use crate::notifier::NotifierHub;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Derived views over the state directory.
    pub aggregator: Arc<Aggregator>,
    /// Fan-out of file change events to SSE clients.
    pub notifier: Arc<NotifierHub>,
    /// Shared secret for `/api`; `None` leaves the API open.
    pub auth_token: Option<String>,
    /// Interval between keepalive comments on `/api/sse`.
    pub keepalive: Duration,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(
        aggregator: Arc<Aggregator>,
        notifier: Arc<NotifierHub>,
        auth_token: Option<String>,
        keepalive: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            aggregator,
            notifier,
            auth_token,
            keepalive,
        })
    }

    /// Run an aggregation on the blocking pool. Aggregations are plain file
    /// reads and must not stall the async workers.
    pub async fn aggregate<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Aggregator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let aggregator = Arc::clone(&self.aggregator);
        tokio::task::spawn_blocking(move || f(&aggregator))
            .await
            .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))
    }
}
