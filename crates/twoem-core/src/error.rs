//! Unified application error types for the portal.
//!
//! Every crate maps its failures into [`AppError`] so that errors propagate
//! through the `?` operator with a single type. The fine-grained
//! [`ErrorCode`] is the closed taxonomy clients see; [`ErrorKind`] groups
//! codes into the categories the HTTP layer maps to status codes.

use std::fmt;
use thiserror::Error;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Credentials or bearer token were rejected.
    Authentication,
    /// The caller is authenticated but not allowed to act.
    Authorization,
    /// The requested resource does not exist.
    NotFound,
    /// Input validation failed.
    Validation,
    /// The request conflicts with current state.
    Conflict,
    /// The eligibility gate refused to release a protected artifact.
    Eligibility,
    /// A time-limited resource is no longer usable.
    Expired,
    /// The backing store failed.
    Database,
    /// The blob store failed.
    Storage,
    /// Configuration could not be loaded.
    Configuration,
    /// A value could not be (de)serialized.
    Serialization,
    /// Anything else.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Eligibility => write!(f, "ELIGIBILITY"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Machine-readable error code returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    /// Username or password did not match.
    InvalidCredentials,
    /// The bearer token is malformed or its signature does not verify.
    InvalidToken,
    /// The bearer token is past its expiry.
    ExpiredToken,
    /// The token subject no longer resolves to an account.
    UnknownSubject,
    /// The caller's role may not perform the operation.
    InsufficientRole,
    /// No such account.
    AccountNotFound,
    /// No such student profile.
    StudentProfileNotFound,
    /// No such password reset request.
    ResetRequestNotFound,
    /// No such eulogy or download item.
    ContentItemNotFound,
    /// A value lies outside its permitted range.
    OutOfRange,
    /// A required field was not supplied.
    MissingField,
    /// The username is already taken.
    DuplicateUsername,
    /// The state machine does not permit this transition.
    InvalidTransition,
    /// The academic average is below the pass mark or undefined.
    ScoreTooLow,
    /// Fees have not been cleared.
    FeesNotCleared,
    /// No certificate has been uploaded.
    NoCertificate,
    /// The reset code is unknown, unapproved, used, or expired.
    InvalidOrExpiredCode,
    /// The content item is inactive or past its expiry.
    ContentExpired,
    /// Backing store failure.
    Database,
    /// Blob store failure.
    Storage,
    /// Configuration failure.
    Configuration,
    /// (De)serialization failure.
    Serialization,
    /// Unexpected internal failure.
    Internal,
}

impl ErrorCode {
    /// Return the category this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::ExpiredToken
            | Self::UnknownSubject => ErrorKind::Authentication,
            Self::InsufficientRole => ErrorKind::Authorization,
            Self::AccountNotFound
            | Self::StudentProfileNotFound
            | Self::ResetRequestNotFound
            | Self::ContentItemNotFound => ErrorKind::NotFound,
            Self::OutOfRange | Self::MissingField => ErrorKind::Validation,
            Self::DuplicateUsername | Self::InvalidTransition => ErrorKind::Conflict,
            Self::ScoreTooLow | Self::FeesNotCleared | Self::NoCertificate => {
                ErrorKind::Eligibility
            }
            Self::InvalidOrExpiredCode | Self::ContentExpired => ErrorKind::Expired,
            Self::Database => ErrorKind::Database,
            Self::Storage => ErrorKind::Storage,
            Self::Configuration => ErrorKind::Configuration,
            Self::Serialization => ErrorKind::Serialization,
            Self::Internal => ErrorKind::Internal,
        }
    }

    /// Return the code as it appears in API error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::UnknownSubject => "UNKNOWN_SUBJECT",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::StudentProfileNotFound => "STUDENT_PROFILE_NOT_FOUND",
            Self::ResetRequestNotFound => "RESET_REQUEST_NOT_FOUND",
            Self::ContentItemNotFound => "CONTENT_ITEM_NOT_FOUND",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::MissingField => "MISSING_FIELD",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::ScoreTooLow => "SCORE_TOO_LOW",
            Self::FeesNotCleared => "FEES_NOT_CLEARED",
            Self::NoCertificate => "NO_CERTIFICATE",
            Self::InvalidOrExpiredCode => "INVALID_OR_EXPIRED_CODE",
            Self::ContentExpired => "CONTENT_EXPIRED",
            Self::Database => "DATABASE_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout the portal.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    /// The error code.
    pub code: ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// Optional structured detail, e.g. the offending field of a validation error.
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Return the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Create an out-of-range validation error naming the offending field.
    pub fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OutOfRange, message)
            .with_details(serde_json::json!({ "field": field }))
    }

    /// Create a missing-field validation error naming the field.
    pub fn missing_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingField, message)
            .with_details(serde_json::json!({ "field": field }))
    }

    /// Create the uniform reset-code failure.
    ///
    /// Every redemption failure must produce this exact error so callers
    /// cannot tell an unknown code from a used, rejected, or expired one.
    pub fn invalid_or_expired_code() -> Self {
        Self::new(ErrorCode::InvalidOrExpiredCode, "Invalid or expired reset code")
    }

    /// Create an insufficient-role error.
    pub fn insufficient_role(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientRole, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Database, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            code: self.code,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorCode::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorCode::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_group_into_kinds() {
        assert_eq!(ErrorCode::ExpiredToken.kind(), ErrorKind::Authentication);
        assert_eq!(ErrorCode::InvalidTransition.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::FeesNotCleared.kind(), ErrorKind::Eligibility);
        assert_eq!(ErrorCode::InvalidOrExpiredCode.kind(), ErrorKind::Expired);
    }

    #[test]
    fn test_out_of_range_carries_field() {
        let err = AppError::out_of_range("ms_word", "Score must be between 0 and 100");
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert_eq!(err.details.unwrap()["field"], "ms_word");
    }

    #[test]
    fn test_display() {
        let err = AppError::invalid_or_expired_code();
        assert_eq!(
            err.to_string(),
            "INVALID_OR_EXPIRED_CODE: Invalid or expired reset code"
        );
    }
}
