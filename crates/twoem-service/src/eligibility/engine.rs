//! Eligibility engine.
//!
//! Eligibility is never stored. It is recomputed from the profile on every
//! read so a later change to scores or payments takes effect immediately.

use serde::Serialize;

use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_entity::student::StudentProfile;

/// Minimum average score for certificate release.
pub const PASS_MARK: f64 = 60.0;

/// Whether an average clears the pass mark. An undefined average never does.
pub fn meets_pass_mark(average: Option<f64>) -> bool {
    average.is_some_and(|avg| avg >= PASS_MARK)
}

/// Why a certificate cannot be released, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Blocker {
    /// No certificate uploaded.
    NoCertificate,
    /// Average below the pass mark, or no scores at all.
    ScoreTooLow,
    /// Balance outstanding.
    FeesNotCleared,
}

impl Blocker {
    /// The error reported when this blocker stops a download.
    pub fn into_error(self) -> AppError {
        match self {
            Self::NoCertificate => {
                AppError::new(ErrorCode::NoCertificate, "No certificate has been uploaded")
            }
            Self::ScoreTooLow => AppError::new(
                ErrorCode::ScoreTooLow,
                format!("Average score must be at least {PASS_MARK}"),
            ),
            Self::FeesNotCleared => {
                AppError::new(ErrorCode::FeesNotCleared, "Fees have not been cleared")
            }
        }
    }
}

/// Derived eligibility of one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    /// Mean of the present scores.
    pub average_score: Option<f64>,
    /// Whether a certificate has been uploaded.
    pub has_certificate: bool,
    /// Whether the balance is settled.
    pub fees_cleared: bool,
    /// Whether the student may download the certificate now.
    pub can_download_certificate: bool,
    /// First failing check, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocker: Option<Blocker>,
}

/// Evaluates certificate eligibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }

    /// Computes eligibility for a profile.
    pub fn evaluate(&self, profile: &StudentProfile) -> Eligibility {
        let average_score = profile.academic.average();
        let has_certificate = profile.has_certificate();
        let fees_cleared = profile.finance.is_cleared;

        let blocker = if !has_certificate {
            Some(Blocker::NoCertificate)
        } else if !meets_pass_mark(average_score) {
            Some(Blocker::ScoreTooLow)
        } else if !fees_cleared {
            Some(Blocker::FeesNotCleared)
        } else {
            None
        };

        Eligibility {
            average_score,
            has_certificate,
            fees_cleared,
            can_download_certificate: blocker.is_none(),
            blocker,
        }
    }

    /// Whether the certificate may be released.
    pub fn can_download_certificate(&self, profile: &StudentProfile) -> bool {
        self.evaluate(profile).can_download_certificate
    }

    /// Fails with the first blocker, if any.
    pub fn require_eligible(&self, profile: &StudentProfile) -> AppResult<()> {
        match self.evaluate(profile).blocker {
            Some(blocker) => Err(blocker.into_error()),
            None => Ok(()),
        }
    }
}
