//! Timer specs understood by the host scheduler.
//!
//! Two forms are accepted:
//!
//! - six space-separated cron fields
//!   `second minute hour day-of-month month day-of-week`, each a
//!   comma-separated list of `*`, `n`, `a-b`, `a/b`, `*/b` or `a-b/c`;
//! - `@sunrise` / `@sunset`, optionally shifted by a signed offset made of
//!   `<n>h`, `<n>m` and `<n>s` parts (`@sunset-1h`, `@sunrise+1h30m`).
//!
//! Sunrise and sunset are resolved by the host from the device location;
//! sunshade only validates and carries the string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A validated timer spec. Displays as the exact string it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timespec {
    raw: String,
    kind: TimespecKind,
}

/// The interpreted shape of a [`Timespec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimespecKind {
    /// Six cron fields.
    Cron,
    /// A solar event shifted by `offset_secs` seconds.
    Solar { event: SolarEvent, offset_secs: i64 },
}

/// Solar events the host scheduler can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarEvent {
    Sunrise,
    Sunset,
}

/// Reasons a timer spec is rejected.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TimespecError {
    #[error("timespec is empty")]
    Empty,

    #[error("expected 6 cron fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid {field} field `{value}`")]
    InvalidField { field: &'static str, value: String },

    #[error("unknown special timespec `{0}`")]
    UnknownSpecial(String),

    #[error("invalid solar offset `{0}`")]
    InvalidOffset(String),
}

struct FieldRule {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const MONTHS: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const WEEKDAYS: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

const FIELDS: [FieldRule; 6] = [
    FieldRule { name: "second", min: 0, max: 59, names: &[] },
    FieldRule { name: "minute", min: 0, max: 59, names: &[] },
    FieldRule { name: "hour", min: 0, max: 23, names: &[] },
    FieldRule { name: "day-of-month", min: 1, max: 31, names: &[] },
    FieldRule { name: "month", min: 1, max: 12, names: MONTHS },
    FieldRule { name: "day-of-week", min: 0, max: 6, names: WEEKDAYS },
];

impl Timespec {
    /// Parse and validate a timer spec.
    ///
    /// # Errors
    ///
    /// Returns [`TimespecError`] when the string follows neither the cron
    /// nor the solar form.
    pub fn parse(input: &str) -> Result<Self, TimespecError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimespecError::Empty);
        }
        let kind = match trimmed.strip_prefix('@') {
            Some(special) => parse_solar(special)?,
            None => {
                parse_cron(trimmed)?;
                TimespecKind::Cron
            }
        };
        Ok(Self {
            raw: trimmed.to_string(),
            kind,
        })
    }

    /// The spec as handed to the host scheduler.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn kind(&self) -> TimespecKind {
        self.kind
    }
}

fn parse_solar(special: &str) -> Result<TimespecKind, TimespecError> {
    let (event, rest) = if let Some(rest) = special.strip_prefix("sunrise") {
        (SolarEvent::Sunrise, rest)
    } else if let Some(rest) = special.strip_prefix("sunset") {
        (SolarEvent::Sunset, rest)
    } else {
        return Err(TimespecError::UnknownSpecial(format!("@{special}")));
    };
    let offset_secs = if rest.is_empty() {
        0
    } else {
        parse_offset(rest).ok_or_else(|| TimespecError::InvalidOffset(rest.to_string()))?
    };
    Ok(TimespecKind::Solar { event, offset_secs })
}

fn parse_offset(offset: &str) -> Option<i64> {
    let (sign, body) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if body.is_empty() {
        return None;
    }
    let mut total: i64 = 0;
    let mut digits = String::new();
    for c in body.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        let amount: i64 = digits.parse().ok()?;
        total = total.checked_add(amount.checked_mul(unit)?)?;
        digits.clear();
    }
    // a trailing number without unit is not allowed
    if !digits.is_empty() {
        return None;
    }
    Some(sign * total)
}

fn parse_cron(input: &str) -> Result<(), TimespecError> {
    let fields: Vec<&str> = input.split_whitespace().collect();
    if fields.len() != FIELDS.len() {
        return Err(TimespecError::FieldCount {
            found: fields.len(),
        });
    }
    for (value, rule) in fields.iter().zip(FIELDS.iter()) {
        if !value.split(',').all(|item| valid_item(item, rule)) {
            return Err(TimespecError::InvalidField {
                field: rule.name,
                value: (*value).to_string(),
            });
        }
    }
    Ok(())
}

fn valid_item(item: &str, rule: &FieldRule) -> bool {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };
    if let Some(step) = step {
        match step.parse::<u32>() {
            Ok(step) if step > 0 => {}
            _ => return false,
        }
    }
    if base == "*" {
        return true;
    }
    match base.split_once('-') {
        Some((from, to)) => match (value_of(from, rule), value_of(to, rule)) {
            (Some(from), Some(to)) => from <= to,
            _ => false,
        },
        None => value_of(base, rule).is_some(),
    }
}

fn value_of(token: &str, rule: &FieldRule) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return (rule.min..=rule.max).contains(&n).then_some(n);
    }
    let upper = token.to_ascii_uppercase();
    let index = rule.names.iter().position(|name| *name == upper)?;
    u32::try_from(index).ok().map(|i| i + rule.min)
}

impl fmt::Display for Timespec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Timespec {
    type Err = TimespecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timespec {
    type Error = TimespecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timespec> for String {
    fn from(value: Timespec) -> Self {
        value.raw
    }
}
