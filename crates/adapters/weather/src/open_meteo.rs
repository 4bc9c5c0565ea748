//! Open-Meteo forecast responses.
//!
//! Temperature and daylight come from `current_weather`. Cloud cover is the
//! high-altitude cloud cover of the current local hour, read from the
//! hourly series which starts at local midnight.

use chrono::DateTime;
use serde::Deserialize;

use sunshade_domain::error::PayloadError;
use sunshade_domain::time::Timestamp;
use sunshade_domain::weather::WeatherSample;

/// Hourly series requested alongside the current weather.
pub(crate) const HOURLY: &str =
    "temperature_2m,cloudcover,cloudcover_low,cloudcover_mid,cloudcover_high";

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    utc_offset_seconds: i64,
    current_weather: Option<CurrentWeather>,
    hourly: Option<Hourly>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    is_day: Option<u8>,
    /// Unix seconds.
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    #[serde(default)]
    cloudcover_high: Vec<Option<f64>>,
}

/// Parse an Open-Meteo body into a sample.
///
/// # Errors
///
/// Returns [`PayloadError`] when the body is not JSON or lacks the current
/// weather or the cloud cover for the current hour.
pub fn parse(body: &str, fetched_at: Timestamp) -> Result<WeatherSample, PayloadError> {
    let response: Response = serde_json::from_str(body)?;
    let current = response
        .current_weather
        .ok_or(PayloadError::MissingField("current_weather"))?;
    let temperature_c = current
        .temperature
        .ok_or(PayloadError::MissingField("current_weather.temperature"))?;
    let time = current
        .time
        .ok_or(PayloadError::MissingField("current_weather.time"))?;

    let local_secs = time
        .checked_add(response.utc_offset_seconds)
        .ok_or_else(|| PayloadError::InvalidField {
            field: "utc_offset_seconds",
            source: "local time out of range".into(),
        })?;
    let hour = usize::try_from(local_secs.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR)
        .map_err(|err| PayloadError::InvalidField {
            field: "current_weather.time",
            source: Box::new(err),
        })?;
    let cloud_cover_pct = response
        .hourly
        .and_then(|hourly| hourly.cloudcover_high.get(hour).copied().flatten())
        .ok_or(PayloadError::MissingField("hourly.cloudcover_high"))?;

    let observed_at = DateTime::from_timestamp(local_secs, 0)
        .ok_or_else(|| PayloadError::InvalidField {
            field: "current_weather.time",
            source: "timestamp out of range".into(),
        })?
        .naive_utc();

    Ok(WeatherSample {
        temperature_c,
        cloud_cover_pct,
        is_daylight: current.is_day.map(|flag| flag != 0),
        observed_at,
        fetched_at,
    })
}
