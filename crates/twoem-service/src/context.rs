//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use twoem_auth::Identity;
use twoem_core::{AppError, AppResult};
use twoem_entity::account::Role;

/// Context for the current authenticated request.
///
/// Built by the API layer from a validated token and passed into service
/// methods so that every operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The caller's account ID.
    pub account_id: Uuid,
    /// The caller's current username.
    pub username: String,
    /// The caller's current role.
    pub role: Role,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for an identity.
    pub fn new(identity: &Identity) -> Self {
        Self {
            account_id: identity.account_id,
            username: identity.username.clone(),
            role: identity.role,
            request_time: Utc::now(),
        }
    }

    /// Fails with `InsufficientRole` unless the caller is an admin.
    pub fn require_admin(&self) -> AppResult<()> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Student => Err(AppError::insufficient_role("Admin access required")),
        }
    }

    /// Fails with `InsufficientRole` unless the caller is a student.
    pub fn require_student(&self) -> AppResult<()> {
        match self.role {
            Role::Student => Ok(()),
            Role::Admin => Err(AppError::insufficient_role("Student access required")),
        }
    }
}
