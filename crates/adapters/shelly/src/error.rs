//! Shelly adapter error types.

use sunshade_domain::error::{NotFoundError, PayloadError, SunshadeError};

/// RPC error code the device uses for a missing key, job or component.
pub const NOT_FOUND: i64 = -105;

/// Errors originating from a Shelly device.
#[derive(Debug, thiserror::Error)]
pub enum ShellyError {
    /// The request could not be sent or the body could not be read.
    #[error("device request failed")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success HTTP status and no RPC frame.
    #[error("device answered with status {0}")]
    Status(u16),

    /// The device rejected the call.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The reply does not carry the expected fields.
    #[error("malformed device reply")]
    Malformed(#[source] PayloadError),
}

impl ShellyError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == NOT_FOUND)
    }

    /// Convert a failed call on `entity` `id` for propagation across port
    /// boundaries, keeping "not found" distinguishable.
    pub(crate) fn into_domain(self, entity: &'static str, id: impl ToString) -> SunshadeError {
        if self.is_not_found() {
            NotFoundError {
                entity,
                id: id.to_string(),
            }
            .into()
        } else {
            self.into()
        }
    }
}

impl From<PayloadError> for ShellyError {
    fn from(err: PayloadError) -> Self {
        Self::Malformed(err)
    }
}

impl From<serde_json::Error> for ShellyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(PayloadError::Decode(err))
    }
}

impl From<ShellyError> for SunshadeError {
    fn from(err: ShellyError) -> Self {
        match err {
            ShellyError::Malformed(payload) => Self::Payload(payload),
            other => Self::Remote(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> ShellyError {
        ShellyError::Rpc {
            code: NOT_FOUND,
            message: "Argument 'id', value 7 not found!".to_string(),
        }
    }

    #[test]
    fn should_recognize_not_found_code() {
        assert!(not_found().is_not_found());
        assert!(
            !ShellyError::Rpc {
                code: -103,
                message: "Invalid argument".to_string()
            }
            .is_not_found()
        );
    }

    #[test]
    fn should_map_not_found_to_domain_not_found() {
        let err = not_found().into_domain("Job", 7);
        assert!(matches!(err, SunshadeError::NotFound(ref e) if e.id == "7"));
    }

    #[test]
    fn should_map_other_rpc_errors_to_remote() {
        let err: SunshadeError = ShellyError::Status(500).into();
        assert!(matches!(err, SunshadeError::Remote(_)));
    }

    #[test]
    fn should_map_malformed_reply_to_payload() {
        let err: SunshadeError = ShellyError::from(PayloadError::MissingField("id")).into();
        assert!(matches!(err, SunshadeError::Payload(_)));
    }
}
