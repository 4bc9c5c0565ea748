//! Virtual weather — returns whatever conditions were last set.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::Local;

use sunshade_app::ports::WeatherProvider;
use sunshade_domain::error::SunshadeError;
use sunshade_domain::time::now;
use sunshade_domain::weather::WeatherSample;

/// The observable part of a [`WeatherSample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub temperature_c: f64,
    pub cloud_cover_pct: f64,
    pub is_daylight: Option<bool>,
}

impl Default for Conditions {
    /// A mild overcast day.
    fn default() -> Self {
        Self {
            temperature_c: 15.0,
            cloud_cover_pct: 80.0,
            is_daylight: Some(true),
        }
    }
}

/// Weather source fed by hand.
#[derive(Debug, Default)]
pub struct VirtualWeather {
    conditions: Mutex<Conditions>,
}

impl VirtualWeather {
    #[must_use]
    pub fn new(conditions: Conditions) -> Self {
        Self {
            conditions: Mutex::new(conditions),
        }
    }

    pub fn set(&self, conditions: Conditions) {
        *self
            .conditions
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = conditions;
    }

    fn conditions(&self) -> Conditions {
        *self
            .conditions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WeatherProvider for VirtualWeather {
    fn fetch(&self) -> impl Future<Output = Result<WeatherSample, SunshadeError>> + Send {
        let conditions = self.conditions();
        let sample = WeatherSample {
            temperature_c: conditions.temperature_c,
            cloud_cover_pct: conditions.cloud_cover_pct,
            is_daylight: conditions.is_daylight,
            observed_at: Local::now().naive_local(),
            fetched_at: now(),
        };
        async move { Ok(sample) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_return_latest_conditions() {
        let weather = VirtualWeather::default();
        weather.set(Conditions {
            temperature_c: 12.0,
            cloud_cover_pct: 10.0,
            is_daylight: None,
        });

        let sample = weather.fetch().await.unwrap();

        assert!((sample.temperature_c - 12.0).abs() < f64::EPSILON);
        assert!((sample.cloud_cover_pct - 10.0).abs() < f64::EPSILON);
        assert_eq!(sample.is_daylight, None);
    }

    #[tokio::test]
    async fn should_stamp_sample_with_fetch_time() {
        let weather = VirtualWeather::new(Conditions::default());
        let before = now();
        let sample = weather.fetch().await.unwrap();
        assert!(sample.fetched_at >= before);
    }
}
