//! wttr.in `format=j2` responses.
//!
//! Numbers come encoded as strings. No daylight flag is reported.

use chrono::NaiveDateTime;
use serde::Deserialize;

use sunshade_domain::error::PayloadError;
use sunshade_domain::time::Timestamp;
use sunshade_domain::weather::WeatherSample;

const OBSERVATION_FORMAT: &str = "%Y-%m-%d %I:%M %p";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    current_condition: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(rename = "temp_C")]
    temperature: Option<String>,
    cloudcover: Option<String>,
    #[serde(rename = "localObsDateTime")]
    observed_at: Option<String>,
}

fn number(field: &'static str, value: Option<&str>) -> Result<f64, PayloadError> {
    let value = value.ok_or(PayloadError::MissingField(field))?;
    value
        .trim()
        .parse()
        .map_err(|err| PayloadError::InvalidField {
            field,
            source: Box::new(err),
        })
}

/// Parse a wttr.in body into a sample.
///
/// # Errors
///
/// Returns [`PayloadError`] when the body is not JSON, has no current
/// condition, or carries unparsable values.
pub fn parse(body: &str, fetched_at: Timestamp) -> Result<WeatherSample, PayloadError> {
    let response: Response = serde_json::from_str(body)?;
    let condition = response
        .current_condition
        .into_iter()
        .next()
        .ok_or(PayloadError::MissingField("current_condition"))?;

    let temperature_c = number("temp_C", condition.temperature.as_deref())?;
    let cloud_cover_pct = number("cloudcover", condition.cloudcover.as_deref())?;
    let observed_at = condition
        .observed_at
        .ok_or(PayloadError::MissingField("localObsDateTime"))?;
    let observed_at = NaiveDateTime::parse_from_str(observed_at.trim(), OBSERVATION_FORMAT)
        .map_err(|err| PayloadError::InvalidField {
            field: "localObsDateTime",
            source: Box::new(err),
        })?;

    Ok(WeatherSample {
        temperature_c,
        cloud_cover_pct,
        is_daylight: None,
        observed_at,
        fetched_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    const BODY: &str = r#"{
        "current_condition": [{
            "FeelsLikeC": "11",
            "cloudcover": "10",
            "humidity": "62",
            "localObsDateTime": "2024-06-21 01:15 PM",
            "temp_C": "12",
            "weatherDesc": [{"value": "Sunny"}]
        }],
        "nearest_area": []
    }"#;

    fn fetched_at() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 21, 11, 16, 0).unwrap()
    }

    #[test]
    fn should_parse_string_encoded_numbers() {
        let sample = parse(BODY, fetched_at()).unwrap();

        assert!((sample.temperature_c - 12.0).abs() < f64::EPSILON);
        assert!((sample.cloud_cover_pct - 10.0).abs() < f64::EPSILON);
        assert_eq!(sample.is_daylight, None);
        assert_eq!(sample.fetched_at, fetched_at());
    }

    #[test]
    fn should_parse_twelve_hour_observation_time() {
        let sample = parse(BODY, fetched_at()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 6, 21)
            .unwrap()
            .and_hms_opt(13, 15, 0)
            .unwrap();
        assert_eq!(sample.observed_at, expected);
    }

    #[test]
    fn should_reject_empty_current_condition() {
        let result = parse(r#"{"current_condition": []}"#, fetched_at());
        assert!(matches!(
            result,
            Err(PayloadError::MissingField("current_condition"))
        ));
    }

    #[test]
    fn should_reject_missing_temperature() {
        let body = r#"{"current_condition": [{"cloudcover": "10", "localObsDateTime": "2024-06-21 01:15 PM"}]}"#;
        assert!(matches!(
            parse(body, fetched_at()),
            Err(PayloadError::MissingField("temp_C"))
        ));
    }

    #[test]
    fn should_reject_non_numeric_cloud_cover() {
        let body = r#"{"current_condition": [{"temp_C": "12", "cloudcover": "lots", "localObsDateTime": "2024-06-21 01:15 PM"}]}"#;
        assert!(matches!(
            parse(body, fetched_at()),
            Err(PayloadError::InvalidField {
                field: "cloudcover",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_non_json_body() {
        assert!(matches!(
            parse("Unknown location", fetched_at()),
            Err(PayloadError::Decode(_))
        ));
    }
}
