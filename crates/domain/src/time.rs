//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// UTC timestamp used for fetch times and diagnostics.
pub type Timestamp = DateTime<Utc>;

/// Wall-clock time at the observation site, as reported by a weather provider.
pub type LocalTime = NaiveDateTime;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
