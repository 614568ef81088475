//! JSON body extractors whose rejections use the API error body.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use twoem_core::{AppError, ErrorCode};

use crate::error::ApiError;

/// Validation code marking a required field left empty.
pub const REQUIRED: &str = "required";

/// `Json<T>` with malformed bodies reported as `MissingField`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::new(ErrorCode::MissingField, rejection.body_text())
                .with_details(serde_json::json!({ "field": "body" }))
        })?;
        Ok(Self(value))
    }
}

/// A JSON body that also passes its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Report the first failing field, in field-name order.
fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let Some((field, failures)) = fields.first() else {
        return AppError::new(ErrorCode::OutOfRange, "Invalid request body");
    };
    let Some(failure) = failures.first() else {
        return AppError::out_of_range(field, format!("Invalid value for {field}"));
    };
    let message = failure
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value for {field}"));

    if failure.code == REQUIRED {
        AppError::missing_field(field, message)
    } else {
        AppError::out_of_range(field, message)
    }
}
