//! HTTP request handlers, grouped by area.

pub mod admin_student;
pub mod auth;
pub mod content;
pub mod health;
pub mod reset;
pub mod student;
pub mod upload;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;

use twoem_core::AppError;

/// Builds an attachment response for a stored file.
pub(crate) fn file_response(
    filename: &str,
    content_type: &str,
    data: Bytes,
) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename.replace('"', "")),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}
