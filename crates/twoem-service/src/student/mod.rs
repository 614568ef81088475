//! Student records: admin management and student self-service.

pub mod admin;
pub mod service;

use serde::Serialize;

use twoem_entity::student::StudentProfile;

use crate::eligibility::Eligibility;

pub use admin::{AdminStudentService, CertificateUpload, CreateStudentRequest};
pub use service::StudentService;

/// A profile together with its login name and derived eligibility.
#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    /// The stored profile.
    #[serde(flatten)]
    pub profile: StudentProfile,
    /// Login name of the owning account.
    pub username: String,
    /// Eligibility computed at read time.
    #[serde(flatten)]
    pub eligibility: Eligibility,
}
