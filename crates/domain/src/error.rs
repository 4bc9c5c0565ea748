//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SunshadeError`] via `From` at the port boundary. "Not found" from a
//! store or device is never an error at the port level: ports return
//! `Option` for that case.

use crate::timespec::TimespecError;

/// Boxed source error carried by the I/O variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every operation crossing a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum SunshadeError {
    /// A domain invariant does not hold.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A required record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistent key/value store failed.
    #[error("storage error")]
    Storage(#[source] BoxError),

    /// A remote peer (device, weather service) could not be reached or refused the call.
    #[error("remote call failed")]
    Remote(#[source] BoxError),

    /// A response or stored value is missing expected fields.
    #[error("malformed payload")]
    Payload(#[from] PayloadError),
}

/// Violations of domain invariants.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A job key is empty.
    #[error("job key must not be empty")]
    EmptyKey,

    /// A cover position is outside `0..=100`.
    #[error("position {0} is outside 0..=100")]
    PositionOutOfRange(i64),

    /// A timer spec does not follow the scheduler grammar.
    #[error("invalid timespec")]
    Timespec(#[from] TimespecError),
}

/// A lookup that was expected to succeed found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A payload could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// A field the caller relies on is absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has an unusable value.
    #[error("invalid value for field `{field}`")]
    InvalidField {
        field: &'static str,
        #[source]
        source: BoxError,
    },

    /// The payload is not valid JSON or does not match the expected shape.
    #[error("undecodable payload")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_sunshade_error() {
        let err: SunshadeError = ValidationError::EmptyKey.into();
        assert!(matches!(
            err,
            SunshadeError::Validation(ValidationError::EmptyKey)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Job",
            id: "7".to_string(),
        };
        assert_eq!(err.to_string(), "Job 7 not found");
    }

    #[test]
    fn should_display_missing_field() {
        let err = PayloadError::MissingField("current_pos");
        assert_eq!(err.to_string(), "missing field `current_pos`");
    }

    #[test]
    fn should_wrap_json_error_as_payload_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{").unwrap_err();
        let err: SunshadeError = PayloadError::from(json_err).into();
        assert!(matches!(err, SunshadeError::Payload(PayloadError::Decode(_))));
    }
}
