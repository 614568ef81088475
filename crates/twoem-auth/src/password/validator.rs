//! Password policy enforcement for new passwords.

use twoem_core::AppError;
use twoem_core::config::auth::AuthConfig;

/// Upper bound on password length, keeping hashing cost bounded.
const MAX_LENGTH: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Returns the first policy violation, if any.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let length = password.chars().count();
        if length < self.min_length || length > MAX_LENGTH {
            return Err(AppError::out_of_range(
                "password",
                format!(
                    "Password must be between {} and {MAX_LENGTH} characters long",
                    self.min_length
                ),
            ));
        }

        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(AppError::out_of_range(
                "password",
                "Password must contain at least one letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::out_of_range(
                "password",
                "Password must contain at least one digit",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twoem_core::ErrorCode;

    #[test]
    fn test_policy() {
        let v = PasswordValidator::new(&AuthConfig::default());
        assert!(v.validate("Kenya2024").is_ok());
        assert_eq!(v.validate("short1").unwrap_err().code, ErrorCode::OutOfRange);
        assert!(v.validate("onlyletters").is_err());
        assert!(v.validate("1234567890").is_err());
        assert!(v.validate(&"a1".repeat(100)).is_err());
    }
}
