//! Error responses returned by the measurement endpoint

use crate::models::api::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug, Clone)]
pub struct ApiError {
    pub(crate) inner: ErrorResponse,
    pub(crate) status: StatusCode,
}

impl ApiError {
    pub fn new<S: Into<String>>(error: S, status: StatusCode) -> Self {
        ApiError {
            inner: ErrorResponse {
                error: error.into(),
                message: None,
            },
            status,
        }
    }

    #[must_use]
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.inner.message = Some(message.into());
        self
    }

    pub fn missing_upload_fields() -> Self {
        Self::new("Missing required fields: data, timestamp, size", StatusCode::BAD_REQUEST)
    }

    pub fn invalid_timestamp<S: Into<String>>(message: S) -> Self {
        Self::new("Invalid timestamp", StatusCode::BAD_REQUEST).with_message(message)
    }

    /// Response for a handler that panicked
    pub fn internal() -> Self {
        Self::new("Internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn generation_failed<S: Into<String>>(message: S) -> Self {
        Self::new("Failed to generate test data", StatusCode::INTERNAL_SERVER_ERROR)
            .with_message(message)
    }

    pub fn not_found(path: &str) -> Self {
        Self::new("Not found", StatusCode::NOT_FOUND)
            .with_message(format!("No route for {}", path))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.inner
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new("Invalid request body", status).with_message(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.inner)).into_response()
    }
}
