//! Job specs, persisted bindings, and the live jobs reported by the host.
//!
//! A [`JobSpec`] is what sunshade wants registered. A [`ScheduleBinding`]
//! is the persisted proof that it was registered once, mapping the job key
//! to the id the host assigned. A [`LiveJob`] is what the host currently
//! has. Reconciliation compares the three.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PayloadError, SunshadeError, ValidationError};
use crate::id::JobId;
use crate::timespec::Timespec;

/// The named entry points a job can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// Enables daytime polling.
    Sunrise,
    /// Weather check and cover decision.
    Periodic,
    /// End-of-day: stop polling and open the cover.
    Finalize,
    /// Disables everything for the night.
    Sunset,
}

impl EntryPoint {
    pub const ALL: [Self; 4] = [Self::Sunrise, Self::Sunset, Self::Periodic, Self::Finalize];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunrise => "sunrise",
            Self::Periodic => "periodic",
            Self::Finalize => "finalize",
            Self::Sunset => "sunset",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known entry point.
#[derive(Debug, thiserror::Error)]
#[error("unknown entry point `{0}`")]
pub struct UnknownEntryPoint(pub String);

impl FromStr for EntryPoint {
    type Err = UnknownEntryPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|entry| entry.as_str() == s)
            .ok_or_else(|| UnknownEntryPoint(s.to_string()))
    }
}

/// A recurring job sunshade wants the host to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Stable identifier, unique per job per controller instance.
    pub key: String,
    pub timespec: Timespec,
    pub entry_point: EntryPoint,
    /// Enabled flag used on first registration.
    pub enabled: bool,
}

impl JobSpec {
    /// Create a builder for constructing a [`JobSpec`].
    #[must_use]
    pub fn builder() -> JobSpecBuilder {
        JobSpecBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SunshadeError::Validation`] when `key` is blank.
    pub fn validate(&self) -> Result<(), SunshadeError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::EmptyKey.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`JobSpec`].
#[derive(Debug, Default)]
pub struct JobSpecBuilder {
    key: Option<String>,
    timespec: Option<String>,
    entry_point: Option<EntryPoint>,
    enabled: Option<bool>,
}

impl JobSpecBuilder {
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn timespec(mut self, timespec: impl Into<String>) -> Self {
        self.timespec = Some(timespec.into());
        self
    }

    #[must_use]
    pub fn entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = Some(entry_point);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Consume the builder, validate, and return a [`JobSpec`].
    ///
    /// The entry point defaults to [`EntryPoint::Periodic`] and the job is
    /// enabled unless told otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SunshadeError::Validation`] if the key is blank or the
    /// timespec is missing or malformed.
    pub fn build(self) -> Result<JobSpec, SunshadeError> {
        let timespec = Timespec::parse(self.timespec.as_deref().unwrap_or_default())
            .map_err(ValidationError::from)?;
        let spec = JobSpec {
            key: self.key.unwrap_or_default(),
            timespec,
            entry_point: self.entry_point.unwrap_or(EntryPoint::Periodic),
            enabled: self.enabled.unwrap_or(true),
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Persisted association between a job key and the host-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBinding {
    pub key: String,
    pub job_id: JobId,
}

impl ScheduleBinding {
    #[must_use]
    pub fn new(key: impl Into<String>, job_id: JobId) -> Self {
        Self {
            key: key.into(),
            job_id,
        }
    }

    /// Serialize for the key/value store.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Decode`] if serialization fails.
    pub fn encode(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read a binding stored under `key`.
    ///
    /// Accepts the JSON record written by [`encode`](Self::encode) as well
    /// as a bare job id, which is how bindings were stored by earlier
    /// device-side scripts.
    ///
    /// The returned binding always carries `key`: the store key a record
    /// lives under wins over the key written inside it.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] if the value is neither form.
    pub fn decode(key: &str, raw: &str) -> Result<Self, PayloadError> {
        if let Ok(job_id) = raw.parse::<JobId>() {
            return Ok(Self::new(key, job_id));
        }
        let stored: Self = serde_json::from_str(raw)?;
        Ok(Self::new(key, stored.job_id))
    }
}

/// Timespecs for the four jobs of a controller instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTimespecs {
    pub sunrise: String,
    pub sunset: String,
    pub periodic: String,
    pub finalize: String,
}

impl Default for JobTimespecs {
    fn default() -> Self {
        Self {
            sunrise: "@sunrise".to_string(),
            sunset: "@sunset".to_string(),
            periodic: "0 45/15 7-14 * * *".to_string(),
            finalize: "30 35 13 * * *".to_string(),
        }
    }
}

/// The four jobs one controller instance owns, one per [`EntryPoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSet {
    pub sunrise: JobSpec,
    pub sunset: JobSpec,
    pub periodic: JobSpec,
    pub finalize: JobSpec,
}

impl JobSet {
    /// Build the job set of `instance`, keyed `sunshade-<instance>-<entry>`.
    ///
    /// # Errors
    ///
    /// Returns [`SunshadeError::Validation`] if a timespec is malformed.
    pub fn for_instance(instance: &str, timespecs: &JobTimespecs) -> Result<Self, SunshadeError> {
        let spec = |entry_point: EntryPoint, timespec: &str| {
            JobSpec::builder()
                .key(Self::key_for(instance, entry_point))
                .timespec(timespec)
                .entry_point(entry_point)
                .build()
        };
        Ok(Self {
            sunrise: spec(EntryPoint::Sunrise, &timespecs.sunrise)?,
            sunset: spec(EntryPoint::Sunset, &timespecs.sunset)?,
            periodic: spec(EntryPoint::Periodic, &timespecs.periodic)?,
            finalize: spec(EntryPoint::Finalize, &timespecs.finalize)?,
        })
    }

    /// Store key of the job firing `entry_point` for `instance`.
    #[must_use]
    pub fn key_for(instance: &str, entry_point: EntryPoint) -> String {
        format!("sunshade-{instance}-{entry_point}")
    }

    #[must_use]
    pub fn get(&self, entry_point: EntryPoint) -> &JobSpec {
        match entry_point {
            EntryPoint::Sunrise => &self.sunrise,
            EntryPoint::Sunset => &self.sunset,
            EntryPoint::Periodic => &self.periodic,
            EntryPoint::Finalize => &self.finalize,
        }
    }

    /// All four specs, in [`EntryPoint::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &JobSpec> {
        EntryPoint::ALL.into_iter().map(|entry| self.get(entry))
    }
}

/// A job as currently known to the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveJob {
    pub id: JobId,
    pub enabled: bool,
    /// Kept verbatim: the host may hold specs sunshade did not write.
    pub timespec: String,
}
