//! Shared application state for the game state API.
//!
//! [`AppState`] is built once per server instance and injected into every
//! handler through Axum's `State` extractor. It holds no per-request data:
//! the accessor owns (and synchronizes) the game world, and the metrics
//! registry owns the only mutable state of this crate.

use std::sync::Arc;

use crate::accessor::GameStateAccessor;
use crate::metrics::HostMetrics;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Live game-world reader.
    pub accessor: Arc<dyn GameStateAccessor>,
    /// Host metrics registry with lifetime peaks.
    pub metrics: Arc<HostMetrics>,
}

impl AppState {
    /// Create application state from its collaborators.
    pub fn new(accessor: Arc<dyn GameStateAccessor>, metrics: Arc<HostMetrics>) -> Self {
        Self { accessor, metrics }
    }
}

impl core::fmt::Debug for AppState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppState")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
