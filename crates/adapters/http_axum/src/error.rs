//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sunshade_app::services::report::describe;
use sunshade_domain::error::SunshadeError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SunshadeError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(SunshadeError);

impl From<SunshadeError> for ApiError {
    fn from(err: SunshadeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SunshadeError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SunshadeError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            SunshadeError::Storage(_) => {
                tracing::error!(error = %describe(&self.0), "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            SunshadeError::Remote(_) | SunshadeError::Payload(_) => {
                tracing::warn!(error = %describe(&self.0), "upstream error");
                (StatusCode::BAD_GATEWAY, describe(&self.0))
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
