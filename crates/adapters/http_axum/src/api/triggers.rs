//! Entry point triggers, called back by the host scheduler.

use axum::Json;
use axum::extract::{Path, State};

use sunshade_app::ports::{CoverActuator, KeyValueStore, ScheduleService, WeatherProvider};
use sunshade_app::services::report::TriggerReport;
use sunshade_domain::error::{NotFoundError, SunshadeError};
use sunshade_domain::schedule::{EntryPoint, UnknownEntryPoint};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET|POST /trigger/{entry_point}` — run one entry point.
///
/// Always answers `200` with the run's report once the entry point is
/// known: failures inside the run are part of the report.
pub async fn run<S, K, W, A>(
    State(state): State<AppState<S, K, W, A>>,
    Path(entry_point): Path<String>,
) -> Result<Json<TriggerReport>, ApiError>
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    let entry_point: EntryPoint = entry_point.parse().map_err(|err: UnknownEntryPoint| {
        ApiError::from(SunshadeError::from(NotFoundError {
            entity: "Entry point",
            id: err.0,
        }))
    })?;

    let orchestrator = state.orchestrator.lock().await;
    tracing::info!(%entry_point, "entry point triggered");
    let report = orchestrator.dispatch(entry_point).await;
    Ok(Json(report))
}
