//! Admin student management: enrolment, record updates, certificates.

use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use twoem_auth::CredentialStore;
use twoem_core::traits::{BlobStore, Clock};
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::{AccountStore, StudentStore};
use twoem_entity::account::{CreateAccount, Role};
use twoem_entity::student::{
    AcademicPatch, Certificate, CreateStudentProfile, FinancePatch, ProfilePatch, StudentProfile,
};

use crate::context::RequestContext;
use crate::eligibility::{Blocker, EligibilityEngine};

use super::StudentView;

/// Request to enrol a new student.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    /// Login name (unique).
    pub username: String,
    /// Initial password; the student is asked to change it on first login.
    pub password: String,
    /// Full legal name.
    pub full_name: String,
    /// National ID or registration number.
    pub id_number: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// An uploaded certificate file.
#[derive(Debug, Clone)]
pub struct CertificateUpload {
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

/// Handles admin operations on student records.
#[derive(Debug, Clone)]
pub struct AdminStudentService {
    /// Account store.
    accounts: Arc<dyn AccountStore>,
    /// Student store.
    students: Arc<dyn StudentStore>,
    /// Certificate bytes.
    blobs: Arc<dyn BlobStore>,
    /// Password digests.
    credentials: Arc<CredentialStore>,
    /// Eligibility.
    eligibility: EligibilityEngine,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl AdminStudentService {
    /// Creates a new admin student service.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        students: Arc<dyn StudentStore>,
        blobs: Arc<dyn BlobStore>,
        credentials: Arc<CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            students,
            blobs,
            credentials,
            eligibility: EligibilityEngine::new(),
            clock,
        }
    }

    /// Creates a student account and profile in one step.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateStudentRequest,
    ) -> AppResult<StudentView> {
        ctx.require_admin()?;

        let username = req.username.trim();
        if username.is_empty() {
            return Err(AppError::missing_field("username", "Username is required"));
        }
        if req.full_name.trim().is_empty() {
            return Err(AppError::missing_field("full_name", "Full name is required"));
        }
        if req.id_number.trim().is_empty() {
            return Err(AppError::missing_field("id_number", "ID number is required"));
        }
        self.credentials.check_policy(&req.password)?;

        let now = self.clock.now();
        let account = CreateAccount {
            username: username.to_string(),
            password_hash: self.credentials.hash(&req.password).await?,
            role: Role::Student,
            email: req.email.clone(),
        }
        .into_account(now);
        let profile = CreateStudentProfile {
            account_id: account.id,
            full_name: req.full_name.trim().to_string(),
            id_number: req.id_number.trim().to_string(),
            email: req.email,
            phone: req.phone,
        }
        .into_profile(now);

        let profile = self.students.create_student(&account, &profile).await?;

        info!(
            student_id = %profile.id,
            username = %account.username,
            created_by = %ctx.username,
            "Student created"
        );
        Ok(self.view_with(profile, account.username))
    }

    /// Lists all students, newest first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<StudentView>> {
        ctx.require_admin()?;
        let profiles = self.students.list_students().await?;
        let mut views = Vec::with_capacity(profiles.len());
        for profile in profiles {
            views.push(self.view(profile).await?);
        }
        Ok(views)
    }

    /// Gets one student.
    pub async fn get(&self, ctx: &RequestContext, student_id: Uuid) -> AppResult<StudentView> {
        ctx.require_admin()?;
        let profile = self.load(student_id).await?;
        self.view(profile).await
    }

    /// Deletes a student's account, profile and certificate file.
    pub async fn delete(&self, ctx: &RequestContext, student_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;
        let profile = self
            .students
            .delete_student(student_id, self.clock.now())
            .await?
            .ok_or_else(|| not_found(student_id))?;

        if let Some(certificate) = &profile.certificate {
            self.blobs.delete(&certificate.blob_key).await?;
        }

        info!(
            student_id = %student_id,
            deleted_by = %ctx.username,
            "Student deleted"
        );
        Ok(())
    }

    /// Applies a contact-details patch.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        student_id: Uuid,
        patch: ProfilePatch,
    ) -> AppResult<StudentView> {
        ctx.require_admin()?;
        let profile = self
            .students
            .update_profile(student_id, &patch, self.clock.now())
            .await?;
        info!(student_id = %student_id, updated_by = %ctx.username, "Student profile updated");
        self.view(profile).await
    }

    /// Applies an academic patch.
    pub async fn update_academic(
        &self,
        ctx: &RequestContext,
        student_id: Uuid,
        patch: AcademicPatch,
    ) -> AppResult<StudentView> {
        ctx.require_admin()?;
        patch.validate()?;
        let profile = self
            .students
            .update_academic(student_id, &patch, self.clock.now())
            .await?;
        info!(
            student_id = %student_id,
            updated_by = %ctx.username,
            average = ?profile.academic.average(),
            "Academic record updated"
        );
        self.view(profile).await
    }

    /// Applies a finance patch and returns the recomputed ledger.
    pub async fn update_finance(
        &self,
        ctx: &RequestContext,
        student_id: Uuid,
        patch: FinancePatch,
    ) -> AppResult<StudentView> {
        ctx.require_admin()?;
        patch.validate()?;
        let profile = self
            .students
            .update_finance(student_id, &patch, self.clock.now())
            .await?;
        info!(
            student_id = %student_id,
            updated_by = %ctx.username,
            balance = profile.finance.balance,
            is_cleared = profile.finance.is_cleared,
            "Finance record updated"
        );
        self.view(profile).await
    }

    /// Stores a certificate file for a student, replacing any earlier one.
    pub async fn upload_certificate(
        &self,
        ctx: &RequestContext,
        student_id: Uuid,
        upload: CertificateUpload,
    ) -> AppResult<StudentView> {
        ctx.require_admin()?;
        if upload.data.is_empty() {
            return Err(AppError::missing_field("file", "Certificate file is empty"));
        }
        let previous = self.load(student_id).await?.certificate;

        let certificate = Certificate {
            student_id,
            blob_key: Certificate::blob_key_for(student_id, Uuid::new_v4()),
            filename: upload.filename,
            content_type: upload.content_type,
            size_bytes: upload.data.len() as i64,
            uploaded_by: ctx.account_id,
            uploaded_at: self.clock.now(),
        };
        self.blobs.put(&certificate.blob_key, upload.data).await?;
        let profile = match self.students.set_certificate(&certificate).await {
            Ok(profile) => profile,
            Err(e) => {
                self.discard_blob(&certificate.blob_key).await;
                return Err(e);
            }
        };
        if let Some(previous) = previous.filter(|p| p.blob_key != certificate.blob_key) {
            self.discard_blob(&previous.blob_key).await;
        }

        info!(
            student_id = %student_id,
            filename = %certificate.filename,
            size = certificate.size_bytes,
            uploaded_by = %ctx.username,
            "Certificate uploaded"
        );
        self.view(profile).await
    }

    /// Fetches a student's certificate without the eligibility gate.
    pub async fn fetch_certificate(
        &self,
        ctx: &RequestContext,
        student_id: Uuid,
    ) -> AppResult<(Certificate, Bytes)> {
        ctx.require_admin()?;
        let profile = self.load(student_id).await?;
        let certificate = profile
            .certificate
            .ok_or_else(|| Blocker::NoCertificate.into_error())?;
        let data = self.blobs.get(&certificate.blob_key).await?;
        Ok((certificate, data))
    }

    async fn discard_blob(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            warn!(blob_key = %key, error = %e, "Failed to remove orphaned blob");
        }
    }

    async fn load(&self, student_id: Uuid) -> AppResult<StudentProfile> {
        self.students
            .find_student(student_id)
            .await?
            .ok_or_else(|| not_found(student_id))
    }

    async fn view(&self, profile: StudentProfile) -> AppResult<StudentView> {
        let account = self
            .accounts
            .find_account(profile.account_id)
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::AccountNotFound,
                    format!("Account of student {} not found", profile.id),
                )
            })?;
        Ok(self.view_with(profile, account.username))
    }

    fn view_with(&self, profile: StudentProfile, username: String) -> StudentView {
        StudentView {
            eligibility: self.eligibility.evaluate(&profile),
            profile,
            username,
        }
    }
}

fn not_found(student_id: Uuid) -> AppError {
    AppError::new(
        ErrorCode::StudentProfileNotFound,
        format!("Student {student_id} not found"),
    )
}
