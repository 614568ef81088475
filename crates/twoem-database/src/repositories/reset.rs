//! Password reset repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_entity::account::Account;
use twoem_entity::reset::model::{APPROVED_RESPONSE, REJECTED_RESPONSE, SUPERSEDED_RESPONSE};
use twoem_entity::reset::{PasswordResetRequest, ResetStatus};

use super::db_error;
use crate::store::ResetStore;

/// Repository for password reset requests.
#[derive(Debug, Clone)]
pub struct ResetRepository {
    pool: PgPool,
}

impl ResetRepository {
    /// Create a new reset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why a conditional transition matched no row.
    async fn transition_failure(&self, id: Uuid, target: ResetStatus) -> AppError {
        match self.find_reset(id).await {
            Ok(Some(current)) => AppError::new(
                ErrorCode::InvalidTransition,
                format!(
                    "Reset request {id} is {} and cannot become {target}",
                    current.status
                ),
            ),
            Ok(None) => AppError::new(
                ErrorCode::ResetRequestNotFound,
                format!("Reset request {id} not found"),
            ),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl ResetStore for ResetRepository {
    async fn create_superseding(
        &self,
        request: &PasswordResetRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        // Serializes concurrent requests for the same student.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&request.student_username)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock reset requests"))?;

        sqlx::query(
            "UPDATE password_resets SET status = $2, responded_at = $3, admin_response = $4 \
             WHERE student_username = $1 AND status = $5",
        )
        .bind(&request.student_username)
        .bind(ResetStatus::Rejected)
        .bind(now)
        .bind(SUPERSEDED_RESPONSE)
        .bind(ResetStatus::Pending)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to supersede pending reset requests"))?;

        let created = sqlx::query_as::<_, PasswordResetRequest>(
            "INSERT INTO password_resets (id, student_username, code, status, requested_at, \
                                          expires_at, responded_at, admin_response) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(request.id)
        .bind(&request.student_username)
        .bind(&request.code)
        .bind(request.status)
        .bind(request.requested_at)
        .bind(request.expires_at)
        .bind(request.responded_at)
        .bind(&request.admin_response)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create reset request"))?;

        tx.commit().await.map_err(db_error("Failed to commit reset request"))?;
        Ok(created)
    }

    async fn find_reset(&self, id: Uuid) -> AppResult<Option<PasswordResetRequest>> {
        sqlx::query_as::<_, PasswordResetRequest>("SELECT * FROM password_resets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find reset request"))
    }

    async fn list_pending_resets(&self) -> AppResult<Vec<PasswordResetRequest>> {
        sqlx::query_as::<_, PasswordResetRequest>(
            "SELECT * FROM password_resets WHERE status = $1 ORDER BY requested_at ASC",
        )
        .bind(ResetStatus::Pending)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list pending reset requests"))
    }

    async fn approve_reset(
        &self,
        id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest> {
        let updated = sqlx::query_as::<_, PasswordResetRequest>(
            "UPDATE password_resets SET status = $2, code = $3, responded_at = $4, \
                                        admin_response = $5 \
             WHERE id = $1 AND status = $6 RETURNING *",
        )
        .bind(id)
        .bind(ResetStatus::Approved)
        .bind(code)
        .bind(now)
        .bind(APPROVED_RESPONSE)
        .bind(ResetStatus::Pending)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to approve reset request"))?;

        match updated {
            Some(r) => Ok(r),
            None => Err(self.transition_failure(id, ResetStatus::Approved).await),
        }
    }

    async fn reject_reset(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<PasswordResetRequest> {
        let updated = sqlx::query_as::<_, PasswordResetRequest>(
            "UPDATE password_resets SET status = $2, responded_at = $3, admin_response = $4 \
             WHERE id = $1 AND status = $5 RETURNING *",
        )
        .bind(id)
        .bind(ResetStatus::Rejected)
        .bind(now)
        .bind(REJECTED_RESPONSE)
        .bind(ResetStatus::Pending)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to reject reset request"))?;

        match updated {
            Some(r) => Ok(r),
            None => Err(self.transition_failure(id, ResetStatus::Rejected).await),
        }
    }

    async fn redeem_reset(
        &self,
        username: &str,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Account> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let consumed = sqlx::query_scalar::<_, Uuid>(
            "UPDATE password_resets SET status = $4 \
             WHERE student_username = $1 AND code = $2 AND status = $5 AND expires_at > $3 \
             RETURNING id",
        )
        .bind(username)
        .bind(code)
        .bind(now)
        .bind(ResetStatus::Used)
        .bind(ResetStatus::Approved)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to consume reset request"))?;

        if consumed.is_none() {
            return Err(AppError::invalid_or_expired_code());
        }

        let account = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET password_hash = $2, is_first_login = FALSE, updated_at = $3 \
             WHERE username = $1 RETURNING *",
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to install reset password"))?
        .ok_or_else(AppError::invalid_or_expired_code)?;

        tx.commit().await.map_err(db_error("Failed to commit password reset"))?;
        Ok(account)
    }
}
