//! Student profile repository implementation.
//!
//! Academic, finance and contact updates lock the profile row with
//! `SELECT … FOR UPDATE`, recompute the record in Rust and write it back in
//! the same transaction, so a concurrent edit can never base its result on
//! a stale total.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_entity::account::Account;
use twoem_entity::reset::ResetStatus;
use twoem_entity::reset::model::STUDENT_REMOVED_RESPONSE;
use twoem_entity::student::{
    AcademicPatch, Certificate, FinancePatch, ProfilePatch, StudentProfile,
};

use super::{db_error, map_account_insert};
use crate::store::StudentStore;

/// Repository for student profiles and certificates.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::new(
        ErrorCode::StudentProfileNotFound,
        format!("Student {id} not found"),
    )
}

async fn load_certificate<'e, E: PgExecutor<'e>>(
    executor: E,
    student_id: Uuid,
) -> AppResult<Option<Certificate>> {
    sqlx::query_as::<_, Certificate>("SELECT * FROM certificates WHERE student_id = $1")
        .bind(student_id)
        .fetch_optional(executor)
        .await
        .map_err(db_error("Failed to load certificate"))
}

async fn lock_profile(conn: &mut PgConnection, id: Uuid) -> AppResult<StudentProfile> {
    sqlx::query_as::<_, StudentProfile>("SELECT * FROM students WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to lock student profile"))?
        .ok_or_else(|| not_found(id))
}

#[async_trait]
impl StudentStore for StudentRepository {
    async fn create_student(
        &self,
        account: &Account,
        profile: &StudentProfile,
    ) -> AppResult<StudentProfile> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, role, email, is_first_login, \
                                   created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(&account.email)
        .bind(account.is_first_login)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_account_insert(&account.username, e))?;

        let a = &profile.academic;
        let f = &profile.finance;
        let created = sqlx::query_as::<_, StudentProfile>(
            "INSERT INTO students (id, account_id, full_name, id_number, email, phone, \
                                   parent_contacts, ms_word, ms_excel, ms_powerpoint, ms_access, \
                                   computer_intro, academic_updated_at, total_fees, paid_amount, \
                                   balance, is_cleared, payment_reference, last_payment_date, \
                                   finance_updated_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, $21, $22) \
             RETURNING *",
        )
        .bind(profile.id)
        .bind(profile.account_id)
        .bind(&profile.full_name)
        .bind(&profile.id_number)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.parent_contacts)
        .bind(a.ms_word)
        .bind(a.ms_excel)
        .bind(a.ms_powerpoint)
        .bind(a.ms_access)
        .bind(a.computer_intro)
        .bind(a.updated_at)
        .bind(f.total_fees)
        .bind(f.paid_amount)
        .bind(f.balance)
        .bind(f.is_cleared)
        .bind(&f.payment_reference)
        .bind(f.last_payment_date)
        .bind(f.updated_at)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create student profile"))?;

        tx.commit().await.map_err(db_error("Failed to commit student creation"))?;
        Ok(created)
    }

    async fn find_student(&self, id: Uuid) -> AppResult<Option<StudentProfile>> {
        let profile = sqlx::query_as::<_, StudentProfile>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find student"))?;

        match profile {
            Some(mut p) => {
                p.certificate = load_certificate(&self.pool, p.id).await?;
                Ok(Some(p))
            }
            None => Ok(None),
        }
    }

    async fn find_student_by_account(
        &self,
        account_id: Uuid,
    ) -> AppResult<Option<StudentProfile>> {
        let profile =
            sqlx::query_as::<_, StudentProfile>("SELECT * FROM students WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find student by account"))?;

        match profile {
            Some(mut p) => {
                p.certificate = load_certificate(&self.pool, p.id).await?;
                Ok(Some(p))
            }
            None => Ok(None),
        }
    }

    async fn list_students(&self) -> AppResult<Vec<StudentProfile>> {
        let mut profiles =
            sqlx::query_as::<_, StudentProfile>("SELECT * FROM students ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to list students"))?;

        let mut certificates: HashMap<Uuid, Certificate> =
            sqlx::query_as::<_, Certificate>("SELECT * FROM certificates")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to list certificates"))?
                .into_iter()
                .map(|c| (c.student_id, c))
                .collect();

        for p in &mut profiles {
            p.certificate = certificates.remove(&p.id);
        }
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        let next = lock_profile(&mut tx, id).await?.apply(patch, now)?;

        let mut updated = sqlx::query_as::<_, StudentProfile>(
            "UPDATE students SET full_name = $2, email = $3, phone = $4, parent_contacts = $5, \
                                 updated_at = $6 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&next.full_name)
        .bind(&next.email)
        .bind(&next.phone)
        .bind(&next.parent_contacts)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update student profile"))?;

        updated.certificate = load_certificate(&mut *tx, id).await?;
        tx.commit().await.map_err(db_error("Failed to commit profile update"))?;
        Ok(updated)
    }

    async fn update_academic(
        &self,
        id: Uuid,
        patch: &AcademicPatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        let current = lock_profile(&mut tx, id).await?;
        let next = current.academic.apply(patch, now)?;

        let mut updated = sqlx::query_as::<_, StudentProfile>(
            "UPDATE students SET ms_word = $2, ms_excel = $3, ms_powerpoint = $4, \
                                 ms_access = $5, computer_intro = $6, \
                                 academic_updated_at = $7, updated_at = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next.ms_word)
        .bind(next.ms_excel)
        .bind(next.ms_powerpoint)
        .bind(next.ms_access)
        .bind(next.computer_intro)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update academic record"))?;

        updated.certificate = load_certificate(&mut *tx, id).await?;
        tx.commit().await.map_err(db_error("Failed to commit academic update"))?;
        Ok(updated)
    }

    async fn update_finance(
        &self,
        id: Uuid,
        patch: &FinancePatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        let current = lock_profile(&mut tx, id).await?;
        let next = current.finance.apply(patch, now)?;

        let mut updated = sqlx::query_as::<_, StudentProfile>(
            "UPDATE students SET total_fees = $2, paid_amount = $3, balance = $4, \
                                 is_cleared = $5, payment_reference = $6, \
                                 last_payment_date = $7, finance_updated_at = $8, \
                                 updated_at = $8 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next.total_fees)
        .bind(next.paid_amount)
        .bind(next.balance)
        .bind(next.is_cleared)
        .bind(&next.payment_reference)
        .bind(next.last_payment_date)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update finance record"))?;

        updated.certificate = load_certificate(&mut *tx, id).await?;
        tx.commit().await.map_err(db_error("Failed to commit finance update"))?;
        Ok(updated)
    }

    async fn set_certificate(&self, certificate: &Certificate) -> AppResult<StudentProfile> {
        sqlx::query(
            "INSERT INTO certificates (student_id, blob_key, filename, content_type, size_bytes, \
                                       uploaded_by, uploaded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (student_id) DO UPDATE SET blob_key = EXCLUDED.blob_key, \
                 filename = EXCLUDED.filename, content_type = EXCLUDED.content_type, \
                 size_bytes = EXCLUDED.size_bytes, uploaded_by = EXCLUDED.uploaded_by, \
                 uploaded_at = EXCLUDED.uploaded_at",
        )
        .bind(certificate.student_id)
        .bind(&certificate.blob_key)
        .bind(&certificate.filename)
        .bind(&certificate.content_type)
        .bind(certificate.size_bytes)
        .bind(certificate.uploaded_by)
        .bind(certificate.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                not_found(certificate.student_id)
            }
            _ => AppError::with_source(ErrorCode::Database, "Failed to store certificate", e),
        })?;

        self.find_student(certificate.student_id)
            .await?
            .ok_or_else(|| not_found(certificate.student_id))
    }

    async fn delete_student(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<StudentProfile>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let mut profile = match lock_profile(&mut tx, id).await {
            Ok(p) => p,
            Err(e) if e.code == ErrorCode::StudentProfileNotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        profile.certificate = load_certificate(&mut *tx, id).await?;

        let username: String =
            sqlx::query_scalar("DELETE FROM accounts WHERE id = $1 RETURNING username")
                .bind(profile.account_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to delete student account"))?;

        // Same lock as reset creation, so no request slips in for the old account.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&username)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock reset requests"))?;

        sqlx::query(
            "UPDATE password_resets SET status = $2, responded_at = $3, admin_response = $4 \
             WHERE student_username = $1 AND status IN ($5, $6)",
        )
        .bind(&username)
        .bind(ResetStatus::Rejected)
        .bind(now)
        .bind(STUDENT_REMOVED_RESPONSE)
        .bind(ResetStatus::Pending)
        .bind(ResetStatus::Approved)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to void reset requests"))?;

        tx.commit().await.map_err(db_error("Failed to commit student deletion"))?;
        Ok(Some(profile))
    }
}
