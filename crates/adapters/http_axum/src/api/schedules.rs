//! Schedule maintenance.

use axum::Json;
use axum::extract::State;

use sunshade_app::ports::{CoverActuator, KeyValueStore, ScheduleService, WeatherProvider};
use sunshade_app::services::report::JobReport;

use crate::state::AppState;

/// `POST /schedules/reconcile` — rerun the startup reconciliation.
pub async fn reconcile<S, K, W, A>(
    State(state): State<AppState<S, K, W, A>>,
) -> Json<Vec<JobReport>>
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    let orchestrator = state.orchestrator.lock().await;
    Json(orchestrator.initialize().await)
}

/// `DELETE /schedules` — delete every job of this instance from the host.
///
/// Bindings stay in the store; the next reconciliation recreates the jobs.
pub async fn remove_all<S, K, W, A>(
    State(state): State<AppState<S, K, W, A>>,
) -> Json<Vec<JobReport>>
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    let orchestrator = state.orchestrator.lock().await;
    Json(orchestrator.remove_all().await)
}
