//! Student profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use twoem_core::types::Patch;
use twoem_core::{AppError, AppResult};

use super::academic::AcademicRecord;
use super::certificate::Certificate;
use super::finance::FinanceRecord;

/// A student's record, owned one-to-one by a student account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentProfile {
    /// Unique profile identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Full legal name.
    pub full_name: String,
    /// National ID or registration number.
    pub id_number: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Parent or guardian contacts, stored as JSON.
    pub parent_contacts: Option<Json<ParentContacts>>,
    /// Subject scores.
    #[sqlx(flatten)]
    pub academic: AcademicRecord,
    /// Fee ledger.
    #[sqlx(flatten)]
    pub finance: FinanceRecord,
    /// Uploaded certificate, loaded from its own table.
    #[sqlx(skip)]
    pub certificate: Option<Certificate>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StudentProfile {
    /// Whether a certificate has been uploaded.
    pub fn has_certificate(&self) -> bool {
        self.certificate.is_some()
    }

    /// Apply a contact-details patch.
    pub fn apply(&self, patch: &ProfilePatch, now: DateTime<Utc>) -> AppResult<Self> {
        patch.validate()?;
        let mut next = self.clone();
        if let Some(full_name) = &patch.full_name {
            next.full_name = full_name.trim().to_string();
        }
        next.email = patch.email.clone().apply(next.email);
        next.phone = patch.phone.clone().apply(next.phone);
        next.parent_contacts = patch
            .parent_contacts
            .clone()
            .apply(next.parent_contacts.map(|c| c.0))
            .map(Json);
        next.updated_at = now;
        Ok(next)
    }
}

/// Names and phone numbers of a student's parents or guardian.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentContacts {
    /// Father's name.
    pub father_name: Option<String>,
    /// Father's phone.
    pub father_phone: Option<String>,
    /// Mother's name.
    pub mother_name: Option<String>,
    /// Mother's phone.
    pub mother_phone: Option<String>,
    /// Guardian's name.
    pub guardian_name: Option<String>,
    /// Guardian's phone.
    pub guardian_phone: Option<String>,
}

/// Data required to create a new profile.
#[derive(Debug, Clone)]
pub struct CreateStudentProfile {
    /// Owning account.
    pub account_id: Uuid,
    /// Full legal name.
    pub full_name: String,
    /// National ID or registration number.
    pub id_number: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl CreateStudentProfile {
    /// Materialize the row with empty academic and finance records.
    pub fn into_profile(self, now: DateTime<Utc>) -> StudentProfile {
        StudentProfile {
            id: Uuid::new_v4(),
            account_id: self.account_id,
            full_name: self.full_name,
            id_number: self.id_number,
            email: self.email,
            phone: self.phone,
            parent_contacts: None,
            academic: AcademicRecord::new(now),
            finance: FinanceRecord::new(now),
            certificate: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a profile's contact details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfilePatch {
    /// New full name; cannot be cleared.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Patch<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Patch<String>,
    /// Parent or guardian contacts.
    #[serde(default)]
    pub parent_contacts: Patch<ParentContacts>,
}

impl ProfilePatch {
    /// A patch replacing only the parent contacts.
    pub fn parent_contacts(contacts: ParentContacts) -> Self {
        Self {
            parent_contacts: Patch::Set(contacts),
            ..Default::default()
        }
    }

    /// Reject empty patches and blank names.
    pub fn validate(&self) -> AppResult<()> {
        if self.full_name.is_none()
            && self.email.is_keep()
            && self.phone.is_keep()
            && self.parent_contacts.is_keep()
        {
            return Err(AppError::missing_field(
                "profile",
                "At least one profile field must be supplied",
            ));
        }
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(AppError::missing_field("full_name", "Full name cannot be blank"));
            }
        }
        Ok(())
    }
}
