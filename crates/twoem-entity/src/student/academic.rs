//! Academic record: five optional percentage scores and their average.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use twoem_core::types::Patch;
use twoem_core::{AppError, AppResult};

/// Highest accepted score.
pub const MAX_SCORE: i16 = 100;

/// The five assessed subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Microsoft Word.
    MsWord,
    /// Microsoft Excel.
    MsExcel,
    /// Microsoft PowerPoint.
    MsPowerpoint,
    /// Microsoft Access.
    MsAccess,
    /// Introduction to computers.
    ComputerIntro,
}

impl Subject {
    /// All subjects in display order.
    pub const ALL: [Subject; 5] = [
        Self::MsWord,
        Self::MsExcel,
        Self::MsPowerpoint,
        Self::MsAccess,
        Self::ComputerIntro,
    ];

    /// Return the field name used in requests and columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MsWord => "ms_word",
            Self::MsExcel => "ms_excel",
            Self::MsPowerpoint => "ms_powerpoint",
            Self::MsAccess => "ms_access",
            Self::ComputerIntro => "computer_intro",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-student scores. Any subset may be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AcademicRecord {
    /// Microsoft Word score.
    pub ms_word: Option<i16>,
    /// Microsoft Excel score.
    pub ms_excel: Option<i16>,
    /// Microsoft PowerPoint score.
    pub ms_powerpoint: Option<i16>,
    /// Microsoft Access score.
    pub ms_access: Option<i16>,
    /// Computer introduction score.
    pub computer_intro: Option<i16>,
    /// When any score last changed.
    #[sqlx(rename = "academic_updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl AcademicRecord {
    /// An empty record.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ms_word: None,
            ms_excel: None,
            ms_powerpoint: None,
            ms_access: None,
            computer_intro: None,
            updated_at: now,
        }
    }

    /// Score for one subject.
    pub fn score(&self, subject: Subject) -> Option<i16> {
        match subject {
            Subject::MsWord => self.ms_word,
            Subject::MsExcel => self.ms_excel,
            Subject::MsPowerpoint => self.ms_powerpoint,
            Subject::MsAccess => self.ms_access,
            Subject::ComputerIntro => self.computer_intro,
        }
    }

    fn slot(&mut self, subject: Subject) -> &mut Option<i16> {
        match subject {
            Subject::MsWord => &mut self.ms_word,
            Subject::MsExcel => &mut self.ms_excel,
            Subject::MsPowerpoint => &mut self.ms_powerpoint,
            Subject::MsAccess => &mut self.ms_access,
            Subject::ComputerIntro => &mut self.computer_intro,
        }
    }

    /// Arithmetic mean of the present scores, `None` when no score is set.
    pub fn average(&self) -> Option<f64> {
        let present: Vec<f64> = Subject::ALL
            .iter()
            .filter_map(|s| self.score(*s))
            .map(f64::from)
            .collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }

    /// Apply a validated patch, producing the next record.
    pub fn apply(&self, patch: &AcademicPatch, now: DateTime<Utc>) -> AppResult<Self> {
        patch.validate()?;
        let mut next = self.clone();
        for subject in Subject::ALL {
            let slot = next.slot(subject);
            // validate() guarantees a whole number within the score range.
            *slot = patch.get(subject).map(|v| v as i16).apply(*slot);
        }
        next.updated_at = now;
        Ok(next)
    }
}

/// Partial update of an academic record.
///
/// Each subject is kept, cleared (`null`), or set to a whole number in
/// `[0, 100]`. Any JSON number deserializes; [`AcademicPatch::validate`]
/// rejects the rest with the subject as the offending field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AcademicPatch {
    /// Microsoft Word.
    #[serde(default)]
    pub ms_word: Patch<f64>,
    /// Microsoft Excel.
    #[serde(default)]
    pub ms_excel: Patch<f64>,
    /// Microsoft PowerPoint.
    #[serde(default)]
    pub ms_powerpoint: Patch<f64>,
    /// Microsoft Access.
    #[serde(default)]
    pub ms_access: Patch<f64>,
    /// Computer introduction.
    #[serde(default)]
    pub computer_intro: Patch<f64>,
}

impl AcademicPatch {
    /// The patch for one subject.
    pub fn get(&self, subject: Subject) -> Patch<f64> {
        match subject {
            Subject::MsWord => self.ms_word,
            Subject::MsExcel => self.ms_excel,
            Subject::MsPowerpoint => self.ms_powerpoint,
            Subject::MsAccess => self.ms_access,
            Subject::ComputerIntro => self.computer_intro,
        }
    }

    /// Reject empty patches and out-of-range scores.
    pub fn validate(&self) -> AppResult<()> {
        if Subject::ALL.iter().all(|s| self.get(*s).is_keep()) {
            return Err(AppError::missing_field(
                "scores",
                "At least one subject score must be supplied",
            ));
        }
        for subject in Subject::ALL {
            if let Some(&value) = self.get(subject).as_set() {
                let whole = value.fract() == 0.0;
                if !whole || !(0.0..=f64::from(MAX_SCORE)).contains(&value) {
                    return Err(AppError::out_of_range(
                        subject.as_str(),
                        format!(
                            "{subject} must be a whole number between 0 and {MAX_SCORE}, got {value}"
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twoem_core::ErrorCode;

    fn record(scores: [Option<i16>; 5]) -> AcademicRecord {
        AcademicRecord {
            ms_word: scores[0],
            ms_excel: scores[1],
            ms_powerpoint: scores[2],
            ms_access: scores[3],
            computer_intro: scores[4],
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_of_present_scores() {
        let r = record([Some(80), Some(70), None, None, None]);
        assert_eq!(r.average(), Some(75.0));
    }

    #[test]
    fn test_average_undefined_when_empty() {
        assert_eq!(AcademicRecord::new(Utc::now()).average(), None);
    }

    #[test]
    fn test_single_zero_score_averages_zero() {
        let r = record([None, None, None, None, Some(0)]);
        assert_eq!(r.average(), Some(0.0));
    }

    #[test]
    fn test_apply_set_clear_keep() {
        let r = record([Some(50), Some(60), Some(70), None, None]);
        let patch = AcademicPatch {
            ms_word: Patch::Set(90.0),
            ms_excel: Patch::Clear,
            ..Default::default()
        };
        let next = r.apply(&patch, Utc::now()).unwrap();
        assert_eq!(next.ms_word, Some(90));
        assert_eq!(next.ms_excel, None);
        assert_eq!(next.ms_powerpoint, Some(70));
    }

    #[test]
    fn test_out_of_range_names_subject() {
        let r = AcademicRecord::new(Utc::now());
        let patch = AcademicPatch {
            ms_access: Patch::Set(101.0),
            ..Default::default()
        };
        let err = r.apply(&patch, Utc::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert_eq!(err.details.unwrap()["field"], "ms_access");

        let negative = AcademicPatch {
            ms_word: Patch::Set(-1.0),
            ..Default::default()
        };
        assert_eq!(
            negative.validate().unwrap_err().code,
            ErrorCode::OutOfRange
        );
    }

    #[test]
    fn test_oversized_and_fractional_scores_name_subject() {
        let patch: AcademicPatch = serde_json::from_str(r#"{"ms_word": 40000}"#).unwrap();
        let err = patch.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert_eq!(err.details.unwrap()["field"], "ms_word");

        let patch: AcademicPatch = serde_json::from_str(r#"{"ms_excel": 75.5}"#).unwrap();
        let err = patch.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert_eq!(err.details.unwrap()["field"], "ms_excel");
    }

    #[test]
    fn test_whole_float_score_is_accepted() {
        let patch: AcademicPatch = serde_json::from_str(r#"{"ms_word": 75.0}"#).unwrap();
        let next = AcademicRecord::new(Utc::now()).apply(&patch, Utc::now()).unwrap();
        assert_eq!(next.ms_word, Some(75));
    }

    #[test]
    fn test_empty_patch_rejected() {
        let err = AcademicPatch::default().validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[test]
    fn test_patch_from_json() {
        let patch: AcademicPatch =
            serde_json::from_str(r#"{"ms_word": 88, "ms_excel": null}"#).unwrap();
        assert_eq!(patch.ms_word, Patch::Set(88.0));
        assert_eq!(patch.ms_excel, Patch::Clear);
        assert_eq!(patch.computer_intro, Patch::Keep);
    }
}
