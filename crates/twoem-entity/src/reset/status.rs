//! Reset request status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a reset request.
///
/// `Pending → Approved → Used`, or `Pending → Rejected`. `Used` and
/// `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reset_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResetStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved; the code may be redeemed once before expiry.
    Approved,
    /// Rejected by an admin or superseded.
    Rejected,
    /// Redeemed.
    Used,
}

impl ResetStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Used)
    }

    /// Whether the state machine permits moving to `next`.
    pub fn can_transition_to(&self, next: ResetStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Used)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Used => "used",
        }
    }
}

impl fmt::Display for ResetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
