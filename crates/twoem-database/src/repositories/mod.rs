//! PostgreSQL implementations of the store traits.

pub mod account;
pub mod content;
pub mod reset;
pub mod student;

pub use account::AccountRepository;
pub use content::ContentRepository;
pub use reset::ResetRepository;
pub use student::StudentRepository;

use twoem_core::{AppError, ErrorCode};

/// Constraint guarding username uniqueness.
pub(crate) const USERNAME_CONSTRAINT: &str = "accounts_username_key";

/// Wrap a sqlx failure as a database error with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorCode::Database, context, e)
}

/// Map a username unique violation to `DuplicateUsername`.
pub(crate) fn map_account_insert(username: &str, e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(USERNAME_CONSTRAINT) => {
            AppError::new(
                ErrorCode::DuplicateUsername,
                format!("Username '{username}' already exists"),
            )
        }
        _ => AppError::with_source(ErrorCode::Database, "Failed to create account", e),
    }
}
