//! Device system configuration.

use serde::Deserialize;
use serde_json::json;

use sunshade_domain::weather::Location;

use crate::client::ShellyClient;
use crate::error::ShellyError;

#[derive(Debug, Deserialize)]
struct SysConfig {
    location: Option<SysLocation>,
}

#[derive(Debug, Deserialize)]
struct SysLocation {
    tz: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl SysLocation {
    fn into_location(self) -> Option<Location> {
        Some(Location {
            latitude: self.lat?,
            longitude: self.lon?,
            timezone: self.tz.unwrap_or_else(|| "auto".to_string()),
        })
    }
}

impl ShellyClient {
    /// The location configured on the device, if it has coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ShellyError`] if the device cannot be queried.
    pub async fn location(&self) -> Result<Option<Location>, ShellyError> {
        let config: SysConfig = self.call("Sys.GetConfig", json!({})).await?;
        Ok(config.location.and_then(SysLocation::into_location))
    }
}
