//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use twoem_core::{AppError, ErrorCode};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details, e.g. the offending field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An `AppError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidCredentials | ErrorCode::InvalidOrExpiredCode => StatusCode::BAD_REQUEST,
        ErrorCode::InvalidToken | ErrorCode::ExpiredToken | ErrorCode::UnknownSubject => {
            StatusCode::UNAUTHORIZED
        }
        ErrorCode::InsufficientRole | ErrorCode::ScoreTooLow | ErrorCode::FeesNotCleared => {
            StatusCode::FORBIDDEN
        }
        ErrorCode::AccountNotFound
        | ErrorCode::StudentProfileNotFound
        | ErrorCode::ResetRequestNotFound
        | ErrorCode::ContentItemNotFound
        | ErrorCode::NoCertificate => StatusCode::NOT_FOUND,
        ErrorCode::OutOfRange | ErrorCode::MissingField => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::DuplicateUsername | ErrorCode::InvalidTransition => StatusCode::CONFLICT,
        ErrorCode::ContentExpired => StatusCode::GONE,
        ErrorCode::Database
        | ErrorCode::Storage
        | ErrorCode::Configuration
        | ErrorCode::Serialization
        | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.code);
        if status.is_server_error() {
            tracing::error!(code = %err.code, error = %err.message, source = ?err.source, "Request failed");
        }

        let body = ApiErrorResponse {
            error: err.code.as_str().to_string(),
            message: err.message,
            details: err.details,
        };

        (status, Json(body)).into_response()
    }
}
