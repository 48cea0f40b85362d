use std::sync::Arc;

use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable job store. Default: `PgJobStore`; tests swap in `MemoryJobStore`.
    pub store: Arc<dyn JobStore>,
}
