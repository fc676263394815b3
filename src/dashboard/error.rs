//! Dashboard error types and their JSON responses.

use crate::utils::error::{ErrorCategory, PreshowError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad form input
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Mailchimp credentials are not configured
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Preshow(#[from] PreshowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Preshow(e) => match e.category() {
                ErrorCategory::Configuration | ErrorCategory::Data => {
                    (StatusCode::BAD_REQUEST, "INVALID_INPUT")
                }
                ErrorCategory::Mailchimp => (StatusCode::BAD_GATEWAY, "MAILCHIMP_ERROR"),
                ErrorCategory::Network => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                ErrorCategory::Template => (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR"),
                ErrorCategory::System => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = code, "Dashboard request failed");
        } else {
            tracing::warn!(error = %self, code = code, "Dashboard request rejected");
        }

        let message = match &self {
            ApiError::Preshow(e) => e.user_friendly_message(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
