//! Student self-service: own profile, parent contacts, certificate download.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use twoem_core::traits::{BlobStore, Clock};
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::StudentStore;
use twoem_entity::student::{Certificate, ParentContacts, ProfilePatch, StudentProfile};

use crate::context::RequestContext;
use crate::eligibility::{Blocker, EligibilityEngine};

use super::StudentView;

/// Operations a student performs on their own record.
#[derive(Debug, Clone)]
pub struct StudentService {
    students: Arc<dyn StudentStore>,
    blobs: Arc<dyn BlobStore>,
    eligibility: EligibilityEngine,
    clock: Arc<dyn Clock>,
}

impl StudentService {
    /// Creates a new student service.
    pub fn new(
        students: Arc<dyn StudentStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            students,
            blobs,
            eligibility: EligibilityEngine::new(),
            clock,
        }
    }

    /// The caller's profile with freshly derived eligibility.
    pub async fn profile(&self, ctx: &RequestContext) -> AppResult<StudentView> {
        let profile = self.own(ctx).await?;
        Ok(self.view(ctx, profile))
    }

    /// Replaces the caller's parent or guardian contacts.
    pub async fn update_parent_contacts(
        &self,
        ctx: &RequestContext,
        contacts: ParentContacts,
    ) -> AppResult<StudentView> {
        let profile = self.own(ctx).await?;
        let profile = self
            .students
            .update_profile(
                profile.id,
                &ProfilePatch::parent_contacts(contacts),
                self.clock.now(),
            )
            .await?;
        info!(student_id = %profile.id, username = %ctx.username, "Parent contacts updated");
        Ok(self.view(ctx, profile))
    }

    /// Releases the caller's certificate once every eligibility check passes.
    pub async fn download_certificate(
        &self,
        ctx: &RequestContext,
    ) -> AppResult<(Certificate, Bytes)> {
        let profile = self.own(ctx).await?;
        self.eligibility.require_eligible(&profile)?;
        let certificate = profile
            .certificate
            .ok_or_else(|| Blocker::NoCertificate.into_error())?;
        let data = self.blobs.get(&certificate.blob_key).await?;

        info!(
            student_id = %profile.id,
            username = %ctx.username,
            "Certificate downloaded"
        );
        Ok((certificate, data))
    }

    async fn own(&self, ctx: &RequestContext) -> AppResult<StudentProfile> {
        ctx.require_student()?;
        self.students
            .find_student_by_account(ctx.account_id)
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::StudentProfileNotFound,
                    "Student profile not found",
                )
            })
    }

    fn view(&self, ctx: &RequestContext, profile: StudentProfile) -> StudentView {
        StudentView {
            eligibility: self.eligibility.evaluate(&profile),
            profile,
            username: ctx.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{admin, auth_config, ctx};
    use crate::student::{AdminStudentService, CertificateUpload, CreateStudentRequest};
    use twoem_auth::CredentialStore;
    use twoem_core::traits::SystemClock;
    use twoem_database::{AccountStore, MemoryStore};
    use twoem_entity::student::{AcademicPatch, FinancePatch};
    use twoem_storage::MemoryBlobStore;
    use uuid::Uuid;

    struct Fixture {
        admin_service: AdminStudentService,
        service: StudentService,
        admin: RequestContext,
        student: RequestContext,
        student_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let credentials = Arc::new(CredentialStore::new(&auth_config(), store.clone()).unwrap());
        let admin_account = admin(&store, &credentials).await;
        let admin_service = AdminStudentService::new(
            store.clone(),
            store.clone(),
            blobs.clone(),
            credentials,
            clock.clone(),
        );
        let service = StudentService::new(store.clone(), blobs, clock);

        let admin = ctx(&admin_account);
        let created = admin_service
            .create(
                &admin,
                CreateStudentRequest {
                    username: "njeri".into(),
                    password: "Initial123".into(),
                    full_name: "Njeri Mwangi".into(),
                    id_number: "16180339".into(),
                    email: None,
                    phone: None,
                },
            )
            .await
            .unwrap();
        let student_account = store
            .find_account_by_username("njeri")
            .await
            .unwrap()
            .unwrap();

        Fixture {
            admin_service,
            service,
            admin,
            student: ctx(&student_account),
            student_id: created.profile.id,
        }
    }

    #[tokio::test]
    async fn test_admin_is_not_a_student() {
        let f = fixture().await;
        let err = f.service.profile(&f.admin).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRole);
    }

    #[tokio::test]
    async fn test_parent_contacts_round_trip_through_profile() {
        let f = fixture().await;
        let contacts = ParentContacts {
            guardian_name: Some("Aunt Wambui".into()),
            guardian_phone: Some("0733000222".into()),
            ..Default::default()
        };
        f.service
            .update_parent_contacts(&f.student, contacts.clone())
            .await
            .unwrap();
        let view = f.service.profile(&f.student).await.unwrap();
        assert_eq!(view.profile.parent_contacts.map(|c| c.0), Some(contacts));
        assert_eq!(view.username, "njeri");
    }

    #[tokio::test]
    async fn test_certificate_gate_follows_ledgers() {
        let f = fixture().await;
        let err = f.service.download_certificate(&f.student).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoCertificate);

        f.admin_service
            .upload_certificate(
                &f.admin,
                f.student_id,
                CertificateUpload {
                    filename: "njeri.pdf".into(),
                    content_type: "application/pdf".into(),
                    data: Bytes::from_static(b"certificate"),
                },
            )
            .await
            .unwrap();
        let err = f.service.download_certificate(&f.student).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ScoreTooLow);

        let scores: AcademicPatch = serde_json::from_str(
            r#"{"ms_word": 70, "ms_excel": 65, "ms_powerpoint": 80, "ms_access": 60, "computer_intro": 75}"#,
        )
        .unwrap();
        f.admin_service
            .update_academic(&f.admin, f.student_id, scores)
            .await
            .unwrap();
        let fees = FinancePatch {
            total_fees: Some(12000.0),
            paid_amount: Some(6000.0),
            payment_reference: None,
        };
        f.admin_service
            .update_finance(&f.admin, f.student_id, fees)
            .await
            .unwrap();
        let err = f.service.download_certificate(&f.student).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FeesNotCleared);

        let settle = FinancePatch {
            paid_amount: Some(12000.0),
            ..Default::default()
        };
        f.admin_service
            .update_finance(&f.admin, f.student_id, settle)
            .await
            .unwrap();
        let (certificate, data) = f.service.download_certificate(&f.student).await.unwrap();
        assert_eq!(certificate.filename, "njeri.pdf");
        assert_eq!(&data[..], b"certificate");

        let view = f.service.profile(&f.student).await.unwrap();
        assert!(view.eligibility.can_download_certificate);
        assert_eq!(view.eligibility.average_score, Some(70.0));
    }
}
