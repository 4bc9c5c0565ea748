//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `sunshade.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use sunshade_adapter_shelly::ShellyConfig;
use sunshade_adapter_weather::Provider;
use sunshade_app::services::orchestrator::OrchestratorSettings;
use sunshade_app::services::report::describe;
use sunshade_domain::cover::Position;
use sunshade_domain::decision::DecisionPolicy;
use sunshade_domain::schedule::{JobSet, JobTimespecs};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Cover device settings.
    pub device: DeviceConfig,
    /// Where bindings and snapshots are kept.
    pub store: StoreConfig,
    /// Weather source settings.
    pub weather: WeatherConfig,
    /// Thresholds and positions of the decision policy.
    pub decision: DecisionConfig,
    /// Scheduled jobs.
    pub schedule: ScheduleConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Shelly Gen2 device reached over JSON-RPC.
    Shelly,
    /// In-process cover and scheduler, for demos and local runs.
    Virtual,
}

/// Cover device configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub kind: DeviceKind,
    /// Base URL of the device (e.g. `http://192.168.33.1`).
    pub url: String,
    /// Cover component id.
    pub cover_id: u32,
    /// Input component acting as manual override, if wired.
    pub input_id: Option<u32>,
    /// Deadline for a single RPC call, in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// The device's own store (the Shelly KVS, or memory for the virtual device).
    Device,
    /// A local `SQLite` database.
    Sqlite,
}

/// Binding and snapshot store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// `SQLite` connection URL, used by the `sqlite` backend.
    pub database_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    Wttr,
    OpenMeteo,
    /// Fixed conditions served in-process.
    Virtual,
}

impl WeatherSource {
    /// The HTTP provider behind this source, if any.
    #[must_use]
    pub fn provider(self) -> Option<Provider> {
        match self {
            Self::Wttr => Some(Provider::Wttr),
            Self::OpenMeteo => Some(Provider::OpenMeteo),
            Self::Virtual => None,
        }
    }
}

/// Weather source configuration.
///
/// Coordinates left unset are read from the device location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub provider: WeatherSource,
    /// Overrides the provider's default endpoint.
    pub endpoint: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// IANA timezone name, or `auto`.
    pub timezone: Option<String>,
    /// Deadline for a single forecast request, in seconds.
    pub timeout_secs: u64,
}

/// Decision thresholds and cover positions (percent open).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub min_temperature: f64,
    pub max_cloud_cover: f64,
    pub normal_position: i64,
    pub sun_protection_position: i64,
    /// Position applied by the finalize job.
    pub final_position: i64,
}

/// Scheduled job configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Distinguishes the job keys of several sunshade instances on one device.
    pub instance: String,
    pub sunrise: String,
    pub sunset: String,
    pub periodic: String,
    pub finalize: String,
    /// Base URL the device calls back into when a job fires.
    pub callback_base: Option<String>,
    /// Store key of the latest weather snapshot.
    pub snapshot_key: String,
    /// Upper bound for the cover work of one trigger, in seconds.
    pub cycle_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `sunshade.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("sunshade.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SUNSHADE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("SUNSHADE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SUNSHADE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("SUNSHADE_DEVICE_URL") {
            self.device.url = val;
        }
        if let Ok(val) = std::env::var("SUNSHADE_DATABASE_URL") {
            self.store.database_url = val;
        }
        if let Ok(val) = std::env::var("SUNSHADE_CALLBACK_BASE") {
            self.schedule.callback_base = Some(val);
        }
        if let Ok(val) = std::env::var("SUNSHADE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.device.kind == DeviceKind::Shelly {
            if self.device.url.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "device.url is required for shelly devices".to_string(),
                ));
            }
            if self.schedule.callback_base.is_none() {
                return Err(ConfigError::Validation(
                    "schedule.callback_base is required for shelly devices".to_string(),
                ));
            }
        }
        if self.store.backend == StoreBackend::Sqlite && self.store.database_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.database_url is required for the sqlite backend".to_string(),
            ));
        }
        if self.weather.latitude.is_some() != self.weather.longitude.is_some() {
            return Err(ConfigError::Validation(
                "weather.latitude and weather.longitude go together".to_string(),
            ));
        }
        for (name, secs) in [
            ("device.timeout_secs", self.device.timeout_secs),
            ("weather.timeout_secs", self.weather.timeout_secs),
            ("schedule.cycle_timeout_secs", self.schedule.cycle_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }
        if !self.decision.min_temperature.is_finite() || !self.decision.max_cloud_cover.is_finite() {
            return Err(ConfigError::Validation(
                "decision thresholds must be finite".to_string(),
            ));
        }
        self.orchestrator_settings().map(|_| ())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Base URL device jobs call back into, defaulting to the bind address.
    #[must_use]
    pub fn callback_base(&self) -> String {
        self.schedule
            .callback_base
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.bind_addr()))
    }

    #[must_use]
    pub fn shelly_config(&self) -> ShellyConfig {
        ShellyConfig {
            url: self.device.url.clone(),
            callback_base: self.callback_base(),
            cover_id: self.device.cover_id,
            input_id: self.device.input_id,
            timeout: Duration::from_secs(self.device.timeout_secs),
        }
    }

    #[must_use]
    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.timeout_secs)
    }

    /// Build the orchestrator settings out of the decision and schedule sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a position is out of range or a
    /// timespec does not parse.
    pub fn orchestrator_settings(&self) -> Result<OrchestratorSettings, ConfigError> {
        let position = |name: &str, value: i64| {
            Position::try_from(value)
                .map_err(|err| ConfigError::Validation(format!("decision.{name}: {err}")))
        };
        let policy = DecisionPolicy {
            min_temperature_c: self.decision.min_temperature,
            max_cloud_cover_pct: self.decision.max_cloud_cover,
            normal_position: position("normal_position", self.decision.normal_position)?,
            sun_protection_position: position(
                "sun_protection_position",
                self.decision.sun_protection_position,
            )?,
        };
        let final_position = position("final_position", self.decision.final_position)?;

        if self.schedule.instance.trim().is_empty() {
            return Err(ConfigError::Validation(
                "schedule.instance must not be blank".to_string(),
            ));
        }
        let timespecs = JobTimespecs {
            sunrise: self.schedule.sunrise.clone(),
            sunset: self.schedule.sunset.clone(),
            periodic: self.schedule.periodic.clone(),
            finalize: self.schedule.finalize.clone(),
        };
        let jobs = JobSet::for_instance(&self.schedule.instance, &timespecs)
            .map_err(|err| ConfigError::Validation(format!("schedule: {}", describe(&err))))?;

        Ok(OrchestratorSettings {
            policy,
            final_position,
            jobs,
            snapshot_key: self.schedule.snapshot_key.clone(),
            cycle_timeout: Duration::from_secs(self.schedule.cycle_timeout_secs),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sunshade=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Virtual,
            url: "http://192.168.33.1".to_string(),
            cover_id: 0,
            input_id: Some(0),
            timeout_secs: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Device,
            database_url: "sqlite:sunshade.db?mode=rwc".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: WeatherSource::Virtual,
            endpoint: None,
            latitude: None,
            longitude: None,
            timezone: None,
            timeout_secs: 10,
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        let policy = DecisionPolicy::default();
        Self {
            min_temperature: policy.min_temperature_c,
            max_cloud_cover: policy.max_cloud_cover_pct,
            normal_position: i64::from(policy.normal_position.get()),
            sun_protection_position: i64::from(policy.sun_protection_position.get()),
            final_position: i64::from(Position::OPEN.get()),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let timespecs = JobTimespecs::default();
        Self {
            instance: "0".to_string(),
            sunrise: timespecs.sunrise,
            sunset: timespecs.sunset,
            periodic: timespecs.periodic,
            finalize: timespecs.finalize,
            callback_base: None,
            snapshot_key: "weather-snapshot".to_string(),
            cycle_timeout_secs: 60,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
