//! # sunshaded — sunshade daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Pick the cover device, the binding store and the weather source
//! - Construct the orchestrator, injecting the adapters via port traits
//! - Reconcile the scheduled jobs once at startup
//! - Build the axum router and serve the trigger endpoints
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sunshade_adapter_http_axum::router;
use sunshade_adapter_http_axum::state::AppState;
use sunshade_adapter_shelly::ShellyClient;
use sunshade_adapter_storage_sqlite_sqlx::SqliteKeyValueStore;
use sunshade_adapter_virtual::{MemoryScheduler, MemoryStore, VirtualCover, VirtualWeather};
use sunshade_adapter_weather::WeatherClient;
use sunshade_app::ports::{CoverActuator, KeyValueStore, ScheduleService, WeatherProvider};
use sunshade_app::services::orchestrator::Orchestrator;
use sunshade_app::services::report::describe;
use sunshade_domain::weather::Location;

use crate::config::{Config, ConfigError, DeviceKind, StoreBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    match config.device.kind {
        DeviceKind::Shelly => {
            let device = ShellyClient::new(config.shelly_config())?;
            let location = resolve_location(&config, Some(&device)).await;
            match config.store.backend {
                StoreBackend::Device => {
                    with_weather(&config, device.clone(), device.clone(), device, location).await
                }
                StoreBackend::Sqlite => {
                    let store = open_sqlite(&config).await?;
                    with_weather(&config, device.clone(), store, device, location).await
                }
            }
        }
        DeviceKind::Virtual => {
            let scheduler = Arc::new(MemoryScheduler::default());
            let cover = Arc::new(VirtualCover::default());
            let location = resolve_location(&config, None).await;
            match config.store.backend {
                StoreBackend::Device => {
                    let store = Arc::new(MemoryStore::default());
                    with_weather(&config, scheduler, store, cover, location).await
                }
                StoreBackend::Sqlite => {
                    let store = open_sqlite(&config).await?;
                    with_weather(&config, scheduler, store, cover, location).await
                }
            }
        }
    }
}

async fn open_sqlite(config: &Config) -> Result<SqliteKeyValueStore, Box<dyn Error>> {
    let db = sunshade_adapter_storage_sqlite_sqlx::Config {
        database_url: config.store.database_url.clone(),
    }
    .build()
    .await?;
    Ok(SqliteKeyValueStore::new(db.pool().clone()))
}

/// Configured coordinates win; otherwise ask the device.
async fn resolve_location(config: &Config, device: Option<&ShellyClient>) -> Option<Location> {
    if let (Some(latitude), Some(longitude)) = (config.weather.latitude, config.weather.longitude) {
        return Some(Location {
            latitude,
            longitude,
            timezone: config
                .weather
                .timezone
                .clone()
                .unwrap_or_else(|| "auto".to_string()),
        });
    }
    match device?.location().await {
        Ok(Some(mut location)) => {
            if let Some(timezone) = &config.weather.timezone {
                location.timezone.clone_from(timezone);
            }
            tracing::info!(
                latitude = location.latitude,
                longitude = location.longitude,
                timezone = %location.timezone,
                "using device location"
            );
            Some(location)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(error = %describe(&err), "failed to read device location");
            None
        }
    }
}

async fn with_weather<S, K, A>(
    config: &Config,
    scheduler: S,
    store: K,
    actuator: A,
    location: Option<Location>,
) -> Result<(), Box<dyn Error>>
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    match config.weather.provider.provider() {
        None => {
            let weather = Arc::new(VirtualWeather::default());
            serve(config, scheduler, store, weather, actuator).await
        }
        Some(provider) => {
            let location = location.ok_or_else(|| {
                ConfigError::Validation(
                    "weather.latitude and weather.longitude are required when the device has no location"
                        .to_string(),
                )
            })?;
            let endpoint = config
                .weather
                .endpoint
                .clone()
                .unwrap_or_else(|| provider.default_endpoint().to_string());
            let weather = WeatherClient::new(provider, endpoint, location, config.weather_timeout())?;
            tracing::info!(provider = ?weather.provider(), "weather client ready");
            serve(config, scheduler, store, weather, actuator).await
        }
    }
}

async fn serve<S, K, W, A>(
    config: &Config,
    scheduler: S,
    store: K,
    weather: W,
    actuator: A,
) -> Result<(), Box<dyn Error>>
where
    S: ScheduleService + Send + Sync + 'static,
    K: KeyValueStore + Clone + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
    A: CoverActuator + Send + Sync + 'static,
{
    let settings = config.orchestrator_settings()?;
    let orchestrator = Orchestrator::new(scheduler, store, weather, actuator, settings);

    for report in orchestrator.initialize().await {
        tracing::info!(key = %report.key, outcome = ?report.outcome, "job reconciled");
    }

    let app = router::build(AppState::new(orchestrator));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "sunshaded listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sunshaded stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}
