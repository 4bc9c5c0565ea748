//! Observable outcomes of entry point runs.
//!
//! Entry points never fail as a whole: each job operation and the cover
//! step report their own outcome, including failures, so callers (the HTTP
//! surface, the logs) always see what happened.

use std::error::Error;
use std::fmt::Write as _;

use serde::Serialize;

use sunshade_domain::cover::{CoverAction, Position};
use sunshade_domain::error::SunshadeError;
use sunshade_domain::id::JobId;
use sunshade_domain::schedule::EntryPoint;

use super::schedule_registry::{Registration, Removal, Toggle};

/// Outcome of a single job operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Created { job_id: JobId },
    Recreated { stale_job_id: JobId, job_id: JobId },
    AlreadyRegistered { job_id: JobId },
    Retimed { job_id: JobId },
    Updated { job_id: JobId, enabled: bool },
    Deleted { job_id: JobId },
    Missing { job_id: JobId },
    Unbound,
    Failed { error: String },
}

impl From<Registration> for JobOutcome {
    fn from(value: Registration) -> Self {
        match value {
            Registration::Created { job_id } => Self::Created { job_id },
            Registration::Recreated {
                stale_job_id,
                job_id,
            } => Self::Recreated {
                stale_job_id,
                job_id,
            },
            Registration::AlreadyRegistered { job_id } => Self::AlreadyRegistered { job_id },
            Registration::Retimed { job_id } => Self::Retimed { job_id },
        }
    }
}

impl From<Toggle> for JobOutcome {
    fn from(value: Toggle) -> Self {
        match value {
            Toggle::Updated { job_id, enabled } => Self::Updated { job_id, enabled },
            Toggle::Missing { job_id } => Self::Missing { job_id },
            Toggle::Unbound => Self::Unbound,
        }
    }
}

impl From<Removal> for JobOutcome {
    fn from(value: Removal) -> Self {
        match value {
            Removal::Deleted { job_id } => Self::Deleted { job_id },
            Removal::Missing { job_id } => Self::Missing { job_id },
            Removal::Unbound => Self::Unbound,
        }
    }
}

impl JobOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of a job operation, tagged with the job key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub key: String,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Outcome of the cover step of an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CoverOutcome {
    /// A move command was sent.
    Moved { from: Position, to: Position },
    /// The cover already sat at the target.
    Skipped { position: Position },
    /// The manual override input is active.
    Overridden,
    /// The conditions call for no change.
    NoDecision,
    /// The cycle was abandoned.
    Failed { error: String },
}

impl CoverOutcome {
    pub(crate) fn from_action(action: CoverAction, current: Position) -> Self {
        match action {
            CoverAction::Skipped => Self::Skipped { position: current },
            CoverAction::MoveTo(to) => Self::Moved { from: current, to },
        }
    }

    pub(crate) fn failed(err: &SunshadeError) -> Self {
        Self::Failed {
            error: describe(err),
        }
    }
}

/// What one entry point run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerReport {
    pub entry_point: EntryPoint,
    pub jobs: Vec<JobReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverOutcome>,
}

/// Render an error with its whole source chain, `outer: inner: root`.
#[must_use]
pub fn describe(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunshade_domain::error::PayloadError;

    #[test]
    fn should_describe_full_error_chain() {
        let err = SunshadeError::from(PayloadError::MissingField("current_pos"));
        assert_eq!(describe(&err), "malformed payload: missing field `current_pos`");
    }

    #[test]
    fn should_serialize_job_report_flat() {
        let report = JobReport {
            key: "sunshade-0-sunrise".to_string(),
            outcome: JobOutcome::Created {
                job_id: JobId::new(3),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "sunshade-0-sunrise", "outcome": "created", "job_id": 3})
        );
    }

    #[test]
    fn should_omit_cover_when_entry_point_does_not_move() {
        let report = TriggerReport {
            entry_point: EntryPoint::Sunset,
            jobs: Vec::new(),
            cover: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"entry_point": "sunset", "jobs": []}));
    }

    #[test]
    fn should_map_registry_outcomes() {
        let job_id = JobId::new(1);
        assert_eq!(
            JobOutcome::from(Toggle::Updated {
                job_id,
                enabled: false
            }),
            JobOutcome::Updated {
                job_id,
                enabled: false
            }
        );
        assert_eq!(JobOutcome::from(Removal::Unbound), JobOutcome::Unbound);
        assert!(!JobOutcome::from(Registration::Retimed { job_id }).is_failure());
    }
}
