//! Password reset request entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ResetStatus;

/// Admin response recorded when a newer request replaces a pending one.
pub const SUPERSEDED_RESPONSE: &str = "Superseded by a newer request";
/// Admin response recorded on approval.
pub const APPROVED_RESPONSE: &str = "Approved by admin";
/// Admin response recorded on rejection.
pub const REJECTED_RESPONSE: &str = "Rejected by admin";
/// Admin response recorded when the requesting student is deleted.
pub const STUDENT_REMOVED_RESPONSE: &str = "Student removed";

/// A student's request to reset a forgotten password.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Username of the requesting student.
    pub student_username: String,
    /// Six-digit code. Replaced on approval; never serialized.
    #[serde(skip_serializing)]
    pub code: String,
    /// Current state.
    pub status: ResetStatus,
    /// When the request was created.
    pub requested_at: DateTime<Utc>,
    /// Hard expiry of the request and its code.
    pub expires_at: DateTime<Utc>,
    /// When an admin (or a superseding request) responded.
    pub responded_at: Option<DateTime<Utc>>,
    /// Response note.
    pub admin_response: Option<String>,
}

impl PasswordResetRequest {
    /// Build a new pending request.
    pub fn pending(username: &str, code: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_username: username.to_string(),
            code,
            status: ResetStatus::Pending,
            requested_at: now,
            expires_at: now + ttl,
            responded_at: None,
            admin_response: None,
        }
    }

    /// Whether `now` is still inside the request's window.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whether `username` and `code` may redeem this request at `now`.
    pub fn is_redeemable(&self, username: &str, code: &str, now: DateTime<Utc>) -> bool {
        self.status == ResetStatus::Approved
            && self.student_username == username
            && self.code == code
            && self.is_live(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(now: DateTime<Utc>) -> PasswordResetRequest {
        let mut r = PasswordResetRequest::pending("jdoe", "123456".into(), now, Duration::hours(24));
        r.status = ResetStatus::Approved;
        r
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        let r = PasswordResetRequest::pending("jdoe", "000001".into(), now, Duration::hours(24));
        assert_eq!(r.expires_at - r.requested_at, Duration::hours(24));
        assert!(r.is_live(now + Duration::hours(23)));
        assert!(!r.is_live(now + Duration::hours(24)));
    }

    #[test]
    fn test_redeemable_requires_everything() {
        let now = Utc::now();
        let r = approved(now);
        assert!(r.is_redeemable("jdoe", "123456", now));
        assert!(!r.is_redeemable("jdoe", "654321", now));
        assert!(!r.is_redeemable("other", "123456", now));
        assert!(!r.is_redeemable("jdoe", "123456", now + Duration::hours(25)));

        let mut pending = r.clone();
        pending.status = ResetStatus::Pending;
        assert!(!pending.is_redeemable("jdoe", "123456", now));
    }

    #[test]
    fn test_code_not_serialized() {
        let json = serde_json::to_value(approved(Utc::now())).unwrap();
        assert!(json.get("code").is_none());
        assert_eq!(json["status"], "approved");
    }
}
