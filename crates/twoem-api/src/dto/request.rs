//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use twoem_entity::content::Audience;
use twoem_service::student::CreateStudentRequest;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, code = "required", message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, code = "required", message = "Password is required"))]
    pub password: String,
}

/// Password change request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// New password; the policy is enforced by the credential store.
    #[validate(length(min = 1, code = "required", message = "New password is required"))]
    pub new_password: String,
}

/// Forgotten password request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Student username.
    #[validate(length(min = 1, code = "required", message = "Username is required"))]
    pub username: String,
}

/// Redemption of an approved reset code.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Student username.
    #[validate(length(min = 1, code = "required", message = "Username is required"))]
    pub username: String,
    /// Code handed out by the admin.
    #[serde(alias = "otp_code")]
    #[validate(length(min = 1, code = "required", message = "Reset code is required"))]
    pub reset_code: String,
    /// Replacement password.
    #[validate(length(min = 1, code = "required", message = "New password is required"))]
    pub new_password: String,
}

/// Admin request to enrol a student.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudentBody {
    /// Login name.
    #[validate(length(min = 1, code = "required", message = "Username is required"))]
    pub username: String,
    /// Initial password.
    #[validate(length(min = 1, code = "required", message = "Password is required"))]
    pub password: String,
    /// Full legal name.
    #[validate(length(min = 1, code = "required", message = "Full name is required"))]
    pub full_name: String,
    /// National ID or registration number.
    #[validate(length(min = 1, code = "required", message = "ID number is required"))]
    pub id_number: String,
    /// Contact email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl From<CreateStudentBody> for CreateStudentRequest {
    fn from(body: CreateStudentBody) -> Self {
        Self {
            username: body.username,
            password: body.password,
            full_name: body.full_name,
            id_number: body.id_number,
            email: body.email,
            phone: body.phone,
        }
    }
}

/// Parse the audience form field. Accepts the legacy `private` alias.
pub fn parse_audience(value: &str) -> Option<Audience> {
    match value.trim().to_ascii_lowercase().as_str() {
        "public" => Some(Audience::Public),
        "students" | "student" | "private" => Some(Audience::Students),
        _ => None,
    }
}
