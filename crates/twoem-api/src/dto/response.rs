//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use twoem_entity::account::{Account, Role};
use twoem_entity::reset::{PasswordResetRequest, ResetStatus};

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The caller's own account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email.
    pub email: Option<String>,
    /// Role.
    pub role: Role,
    /// Whether the initial password is still in use.
    pub is_first_login: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
            is_first_login: account.is_first_login,
        }
    }
}

/// Acknowledgement of a filed reset request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequestedResponse {
    /// Human-readable message.
    pub message: String,
    /// The new request.
    pub request_id: Uuid,
}

/// A reset request in the admin queue. The code is never included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequestResponse {
    /// Request ID.
    pub id: Uuid,
    /// Requesting student.
    pub student_username: String,
    /// When it was filed.
    pub requested_at: DateTime<Utc>,
    /// When it lapses.
    pub expires_at: DateTime<Utc>,
    /// Current state.
    pub status: ResetStatus,
    /// Response note, if any.
    pub admin_response: Option<String>,
}

impl From<PasswordResetRequest> for ResetRequestResponse {
    fn from(r: PasswordResetRequest) -> Self {
        Self {
            id: r.id,
            student_username: r.student_username,
            requested_at: r.requested_at,
            expires_at: r.expires_at,
            status: r.status,
            admin_response: r.admin_response,
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Current server time.
    pub timestamp: DateTime<Utc>,
}
