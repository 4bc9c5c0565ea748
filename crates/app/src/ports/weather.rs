//! Weather port — one sample of the current conditions per call.

use std::future::Future;
use std::sync::Arc;

use sunshade_domain::error::SunshadeError;
use sunshade_domain::weather::WeatherSample;

/// Fetches the current weather at the controller's location.
pub trait WeatherProvider {
    /// Fetch one sample.
    ///
    /// Transport failures map to [`SunshadeError::Remote`], responses missing
    /// expected fields to [`SunshadeError::Payload`].
    fn fetch(&self) -> impl Future<Output = Result<WeatherSample, SunshadeError>> + Send;
}

impl<T: WeatherProvider + Send + Sync> WeatherProvider for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<WeatherSample, SunshadeError>> + Send {
        (**self).fetch()
    }
}
