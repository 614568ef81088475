//! Password reset workflow.
//!
//! A student files a request; an admin approves it, which generates the
//! one-time code handed to the student out of band, or rejects it. The
//! student redeems the approved code together with a new password.
//!
//! ```text
//! Pending ──approve──▶ Approved ──redeem──▶ Used
//!    │
//!    └──reject / superseded──▶ Rejected
//! ```
//!
//! Every transition is a single atomic store operation, so two admins
//! approving at once or two redemptions racing cannot both succeed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use twoem_auth::CredentialStore;
use twoem_core::config::auth::AuthConfig;
use twoem_core::traits::Clock;
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::{AccountStore, ResetStore};
use twoem_entity::account::Role;
use twoem_entity::reset::PasswordResetRequest;

use crate::context::RequestContext;

/// Result of an approval: the request and the code to hand to the student.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedReset {
    /// The request that was approved.
    pub request_id: Uuid,
    /// The one-time code.
    pub otp_code: String,
    /// When the code stops working.
    pub expires_at: DateTime<Utc>,
}

/// Drives reset requests through their state machine.
#[derive(Debug, Clone)]
pub struct PasswordResetWorkflow {
    accounts: Arc<dyn AccountStore>,
    resets: Arc<dyn ResetStore>,
    credentials: Arc<CredentialStore>,
    clock: Arc<dyn Clock>,
    code_ttl: Duration,
}

impl PasswordResetWorkflow {
    /// Creates the workflow with the code lifetime from `auth.reset_code_ttl_hours`.
    pub fn new(
        config: &AuthConfig,
        accounts: Arc<dyn AccountStore>,
        resets: Arc<dyn ResetStore>,
        credentials: Arc<CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            resets,
            credentials,
            clock,
            code_ttl: Duration::hours(config.reset_code_ttl_hours as i64),
        }
    }

    /// Files a reset request for a student.
    ///
    /// Any earlier pending request of the same student is superseded.
    pub async fn request(&self, username: &str) -> AppResult<PasswordResetRequest> {
        let account = self.accounts.find_account_by_username(username).await?;
        match account {
            Some(a) if a.role == Role::Student => {}
            _ => {
                return Err(AppError::new(
                    ErrorCode::AccountNotFound,
                    format!("No student account named '{username}'"),
                ));
            }
        }

        let now = self.clock.now();
        let request = PasswordResetRequest::pending(username, generate_code(), now, self.code_ttl);
        let request = self.resets.create_superseding(&request, now).await?;

        info!(
            request_id = %request.id,
            username = %username,
            "Password reset requested"
        );
        Ok(request)
    }

    /// Lists pending requests for the admin queue.
    pub async fn list_pending(&self, ctx: &RequestContext) -> AppResult<Vec<PasswordResetRequest>> {
        ctx.require_admin()?;
        self.resets.list_pending_resets().await
    }

    /// Approves a pending request and returns the fresh one-time code.
    pub async fn approve(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ApprovedReset> {
        ctx.require_admin()?;
        let code = generate_code();
        let request = self
            .resets
            .approve_reset(request_id, &code, self.clock.now())
            .await?;

        info!(
            request_id = %request.id,
            username = %request.student_username,
            approved_by = %ctx.username,
            "Password reset approved"
        );
        Ok(ApprovedReset {
            request_id: request.id,
            otp_code: code,
            expires_at: request.expires_at,
        })
    }

    /// Rejects a pending request.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
    ) -> AppResult<PasswordResetRequest> {
        ctx.require_admin()?;
        let request = self
            .resets
            .reject_reset(request_id, self.clock.now())
            .await?;

        info!(
            request_id = %request.id,
            username = %request.student_username,
            rejected_by = %ctx.username,
            "Password reset rejected"
        );
        Ok(request)
    }

    /// Redeems an approved code, installing `new_password`.
    ///
    /// Unknown, unapproved, rejected, used and expired codes all fail with
    /// the same `InvalidOrExpiredCode` error.
    pub async fn redeem(&self, username: &str, code: &str, new_password: &str) -> AppResult<()> {
        self.credentials.check_policy(new_password)?;
        let digest = self.credentials.hash(new_password).await?;

        match self
            .resets
            .redeem_reset(username, code, &digest, self.clock.now())
            .await
        {
            Ok(account) => {
                info!(account_id = %account.id, username = %username, "Password reset completed");
                Ok(())
            }
            Err(e) if e.code == ErrorCode::InvalidOrExpiredCode => {
                warn!(username = %username, "Rejected password reset code");
                Err(AppError::invalid_or_expired_code())
            }
            Err(e) => Err(e),
        }
    }
}

/// Random six-digit code, zero padded.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}
