//! Weather adapter error types.

use sunshade_domain::error::{PayloadError, SunshadeError};

/// Errors originating from a weather provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The request could not be sent or the body could not be read.
    #[error("weather request failed")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("weather provider answered with status {0}")]
    Status(u16),

    /// The body does not carry the expected fields.
    #[error("malformed weather response")]
    Malformed(#[source] PayloadError),
}

impl From<WeatherError> for SunshadeError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Malformed(payload) => Self::Payload(payload),
            other => Self::Remote(Box::new(other)),
        }
    }
}
