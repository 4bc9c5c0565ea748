//! Decision policy — weather sample to target cover position.

use serde::{Deserialize, Serialize};

use crate::cover::Position;
use crate::weather::WeatherSample;

/// Thresholds and target positions used to pick a cover position.
///
/// Sun protection kicks in only when it is strictly warmer than
/// `min_temperature_c` **and** strictly less cloudy than
/// `max_cloud_cover_pct`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub min_temperature_c: f64,
    pub max_cloud_cover_pct: f64,
    pub normal_position: Position,
    pub sun_protection_position: Position,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            min_temperature_c: 8.0,
            max_cloud_cover_pct: 20.0,
            normal_position: Position::OPEN,
            sun_protection_position: Position::saturating(60),
        }
    }
}

impl DecisionPolicy {
    /// Decide the target position for one sample.
    ///
    /// Returns `None` when the manual override is active, or when it is
    /// known to be night and sun protection does not apply.
    #[must_use]
    pub fn decide(&self, sample: &WeatherSample, manual_override: bool) -> Option<Position> {
        if manual_override {
            return None;
        }
        if sample.temperature_c > self.min_temperature_c
            && sample.cloud_cover_pct < self.max_cloud_cover_pct
        {
            return Some(self.sun_protection_position);
        }
        match sample.is_daylight {
            None | Some(true) => Some(self.normal_position),
            Some(false) => None,
        }
    }
}
