//! HTTP mapping for `PulseError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use pulsewatch_core::PulseError;

/// Handler error: a `PulseError` rendered as `{error, message}` JSON.
#[derive(Debug)]
pub struct ApiError(pub PulseError);

impl From<PulseError> for ApiError {
    fn from(e: PulseError) -> Self {
        Self(e)
    }
}

impl ApiError {
    /// Message safe to show clients; backend details stay in the logs.
    fn public_message(&self) -> String {
        match &self.0 {
            PulseError::BackendUnavailable(_) => "storage backend unavailable".into(),
            PulseError::InternalFault(_) => "internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PulseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PulseError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PulseError::InternalFault(_)
            | PulseError::BadConfig(_)
            | PulseError::UnsupportedVersion => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(code = self.0.code().as_str(), error = %self.0, "request failed");
        let body = Json(json!({
            "error": self.0.code().as_str(),
            "message": self.public_message(),
        }));
        (status, body).into_response()
    }
}
