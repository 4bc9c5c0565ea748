//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use sunshade_app::ports::{CoverActuator, KeyValueStore, ScheduleService, WeatherProvider};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<S, K, W, A>(state: AppState<S, K, W, A>) -> Router
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
