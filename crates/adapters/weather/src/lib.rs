//! # sunshade-adapter-weather
//!
//! HTTP weather adapter using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `WeatherProvider` port defined in `sunshade-app::ports`
//! - Query wttr.in (`format=j2`) or Open-Meteo for the controller's location
//! - Turn provider responses into a `WeatherSample`
//!
//! Parsing is kept in pure functions ([`wttr::parse`], [`open_meteo::parse`])
//! taking the fetch time explicitly.
//!
//! ## Dependency rule
//! Depends on `sunshade-app` (for port traits) and `sunshade-domain` (for domain types).

mod error;
pub mod open_meteo;
pub mod wttr;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use sunshade_app::ports::WeatherProvider;
use sunshade_domain::error::SunshadeError;
use sunshade_domain::time::now;
use sunshade_domain::weather::{Location, WeatherSample};

pub use crate::error::WeatherError;

/// The weather services sunshade can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Wttr,
    OpenMeteo,
}

impl Provider {
    /// Public endpoint of the service.
    #[must_use]
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::Wttr => "https://wttr.in",
            Self::OpenMeteo => "https://api.open-meteo.com/v1/forecast",
        }
    }
}

/// [`WeatherProvider`] querying a public weather service over HTTP.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    provider: Provider,
    endpoint: String,
    location: Location,
}

impl WeatherClient {
    /// Create a client for `provider` at `endpoint`.
    ///
    /// Every request is abandoned after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the HTTP client cannot be built.
    pub fn new(
        provider: Provider,
        endpoint: impl Into<String>,
        location: Location,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            provider,
            endpoint: endpoint.into(),
            location,
        })
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let Location {
            latitude,
            longitude,
            timezone,
        } = &self.location;
        match self.provider {
            Provider::Wttr => {
                let url = format!(
                    "{}/{latitude},{longitude}",
                    self.endpoint.trim_end_matches('/')
                );
                self.client.get(url).query(&[("format", "j2")])
            }
            Provider::OpenMeteo => self.client.get(&self.endpoint).query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", open_meteo::HOURLY.to_string()),
                ("current_weather", "true".to_string()),
                ("timeformat", "unixtime".to_string()),
                ("timezone", timezone.clone()),
                ("forecast_days", "1".to_string()),
            ]),
        }
    }

    async fn fetch_sample(&self) -> Result<WeatherSample, WeatherError> {
        tracing::debug!(provider = ?self.provider, "fetching weather");
        let response = self.request().send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(provider = ?self.provider, status = status.as_u16(), "weather request refused");
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let fetched_at = now();
        let parsed = match self.provider {
            Provider::Wttr => wttr::parse(&body, fetched_at),
            Provider::OpenMeteo => open_meteo::parse(&body, fetched_at),
        };
        parsed.map_err(WeatherError::Malformed)
    }
}

impl WeatherProvider for WeatherClient {
    fn fetch(&self) -> impl Future<Output = Result<WeatherSample, SunshadeError>> + Send {
        let client = self.clone();
        async move { Ok(client.fetch_sample().await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn location() -> Location {
        Location {
            latitude: 52.52,
            longitude: 13.41,
            timezone: "Europe/Berlin".to_string(),
        }
    }

    #[test]
    fn should_put_coordinates_in_wttr_path() {
        let client = WeatherClient::new(Provider::Wttr, "http://wttr.in/", location(), TIMEOUT).unwrap();
        let request = client.request().build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://wttr.in/52.52,13.41?format=j2"
        );
    }

    #[test]
    fn should_query_open_meteo_for_current_weather_and_hourly_clouds() {
        let client = WeatherClient::new(
            Provider::OpenMeteo,
            Provider::OpenMeteo.default_endpoint(),
            location(),
            TIMEOUT,
        )
        .unwrap();
        let request = client.request().build().unwrap();
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("latitude".to_string(), "52.52".to_string())));
        assert!(pairs.contains(&("current_weather".to_string(), "true".to_string())));
        assert!(pairs.contains(&("timeformat".to_string(), "unixtime".to_string())));
        assert!(pairs.contains(&("timezone".to_string(), "Europe/Berlin".to_string())));
        assert!(pairs.contains(&(
            "hourly".to_string(),
            open_meteo::HOURLY.to_string()
        )));
    }

    #[tokio::test]
    async fn should_report_remote_error_when_unreachable() {
        let client =
            WeatherClient::new(Provider::Wttr, "http://127.0.0.1:9", location(), TIMEOUT).unwrap();
        let result = client.fetch().await;
        assert!(matches!(result, Err(SunshadeError::Remote(_))));
    }

    #[tokio::test]
    async fn should_give_up_on_a_service_that_never_answers() {
        // Connections land in the backlog and are never served.
        let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", silent.local_addr().unwrap());
        let client = WeatherClient::new(
            Provider::Wttr,
            endpoint,
            location(),
            Duration::from_millis(100),
        )
        .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), client.fetch())
            .await
            .expect("request should time out on its own");

        assert!(matches!(result, Err(SunshadeError::Remote(_))));
    }
}
