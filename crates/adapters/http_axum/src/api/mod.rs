//! JSON handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod schedules;
#[allow(clippy::missing_errors_doc)]
pub mod triggers;

use axum::Router;
use axum::routing::{delete, get, post};

use sunshade_app::ports::{CoverActuator, KeyValueStore, ScheduleService, WeatherProvider};

use crate::state::AppState;

/// Build the trigger and schedule routes.
pub fn routes<S, K, W, A>() -> Router<AppState<S, K, W, A>>
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/trigger/{entry_point}",
            get(triggers::run::<S, K, W, A>).post(triggers::run::<S, K, W, A>),
        )
        .route("/schedules", delete(schedules::remove_all::<S, K, W, A>))
        .route(
            "/schedules/reconcile",
            post(schedules::reconcile::<S, K, W, A>),
        )
}
