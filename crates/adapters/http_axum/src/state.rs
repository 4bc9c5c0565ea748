//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use sunshade_app::services::orchestrator::Orchestrator;

/// Application state shared across all axum handlers.
///
/// The orchestrator sits behind an async mutex so that entry points run one
/// at a time, whichever way they are triggered. `Clone` is implemented
/// manually so the port types themselves do not need to be `Clone`.
pub struct AppState<S, K, W, A> {
    pub orchestrator: Arc<Mutex<Orchestrator<S, K, W, A>>>,
}

impl<S, K, W, A> Clone for AppState<S, K, W, A> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

impl<S, K, W, A> AppState<S, K, W, A> {
    /// Create a new application state owning the orchestrator.
    pub fn new(orchestrator: Orchestrator<S, K, W, A>) -> Self {
        Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
        }
    }
}
