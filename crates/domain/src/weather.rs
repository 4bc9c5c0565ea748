//! Weather sample handed from a provider to the decision policy.

use serde::{Deserialize, Serialize};

use crate::time::{LocalTime, Timestamp};

/// One observation of the current weather.
///
/// Held for a single decision cycle, then persisted as a diagnostic
/// snapshot. Nothing reads the snapshot back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub temperature_c: f64,
    pub cloud_cover_pct: f64,
    /// `None` when the provider does not report daylight.
    pub is_daylight: Option<bool>,
    /// Observation time in the site's local wall-clock time.
    pub observed_at: LocalTime,
    pub fetched_at: Timestamp,
}

/// Where the controller stands, used to query weather providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA time zone name, e.g. `Europe/Berlin`.
    pub timezone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn should_serialize_snapshot_with_unknown_daylight_as_null() {
        let sample = WeatherSample {
            temperature_c: 12.0,
            cloud_cover_pct: 10.0,
            is_daylight: None,
            observed_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(10, 15, 0)
                .unwrap(),
            fetched_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 16, 0).unwrap(),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["temperature_c"], 12.0);
        assert!(json["is_daylight"].is_null());
        assert_eq!(json["observed_at"], "2024-06-01T10:15:00");
    }
}
