//! Mapping of pipeline errors onto HTTP responses

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use crate::api::types::ErrorResponse;
use crate::errors::EventPulseError;

/// API error carrying the status code and the user-facing message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<EventPulseError> for ApiError {
    fn from(err: EventPulseError) -> Self {
        let status = match &err {
            EventPulseError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            EventPulseError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            EventPulseError::RequestInProgress(_) => StatusCode::CONFLICT,
            EventPulseError::RetrievalUnavailable(_)
            | EventPulseError::GenerationUnavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
