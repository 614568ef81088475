//! Store traits injected into the services.
//!
//! Each trait covers one aggregate. Implementations must make every
//! mutating method atomic with respect to concurrent calls on the same
//! record and must leave the record untouched when they fail.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use twoem_core::AppResult;
use twoem_entity::account::{Account, Role};
use twoem_entity::content::{ContentItem, ContentKind};
use twoem_entity::reset::PasswordResetRequest;
use twoem_entity::student::{
    AcademicPatch, Certificate, FinancePatch, ProfilePatch, StudentProfile,
};

/// Accounts of both roles.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an account. Fails with `DuplicateUsername` on a clash.
    async fn create_account(&self, account: &Account) -> AppResult<Account>;

    /// Find an account by primary key.
    async fn find_account(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find an account by exact username.
    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Replace the password digest and clear the first-login flag.
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Account>;

    /// Count accounts holding `role`.
    async fn count_by_role(&self, role: Role) -> AppResult<u64>;
}

/// Student profiles with their academic and finance records and certificate.
#[async_trait]
pub trait StudentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a student account and its profile together.
    ///
    /// Fails with `DuplicateUsername` without inserting either row.
    async fn create_student(
        &self,
        account: &Account,
        profile: &StudentProfile,
    ) -> AppResult<StudentProfile>;

    /// Find a profile by its id.
    async fn find_student(&self, id: Uuid) -> AppResult<Option<StudentProfile>>;

    /// Find the profile owned by an account.
    async fn find_student_by_account(&self, account_id: Uuid)
        -> AppResult<Option<StudentProfile>>;

    /// All profiles, newest first.
    async fn list_students(&self) -> AppResult<Vec<StudentProfile>>;

    /// Apply a contact-details patch.
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile>;

    /// Apply an academic patch.
    async fn update_academic(
        &self,
        id: Uuid,
        patch: &AcademicPatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile>;

    /// Apply a finance patch, recomputing balance and clearance.
    async fn update_finance(
        &self,
        id: Uuid,
        patch: &FinancePatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile>;

    /// Attach or replace the certificate metadata.
    async fn set_certificate(&self, certificate: &Certificate) -> AppResult<StudentProfile>;

    /// Delete a profile and its account. Returns the removed profile.
    ///
    /// Pending and approved reset requests filed under the account's
    /// username are rejected in the same step, so a later account with the
    /// same username cannot redeem them.
    async fn delete_student(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<StudentProfile>>;
}

/// Password reset requests.
#[async_trait]
pub trait ResetStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a pending request, rejecting any earlier pending request of
    /// the same student in the same step.
    async fn create_superseding(
        &self,
        request: &PasswordResetRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest>;

    /// Find a request by id.
    async fn find_reset(&self, id: Uuid) -> AppResult<Option<PasswordResetRequest>>;

    /// Pending requests, oldest first.
    async fn list_pending_resets(&self) -> AppResult<Vec<PasswordResetRequest>>;

    /// Move a pending request to approved with a fresh code.
    ///
    /// `ResetRequestNotFound` for an unknown id, `InvalidTransition` when
    /// the request is no longer pending.
    async fn approve_reset(
        &self,
        id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest>;

    /// Move a pending request to rejected.
    async fn reject_reset(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<PasswordResetRequest>;

    /// Consume an approved, unexpired request and install the new digest.
    ///
    /// The request becomes `Used` and the account's digest and first-login
    /// flag change in one step. Any failure is `InvalidOrExpiredCode`.
    async fn redeem_reset(
        &self,
        username: &str,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Account>;
}

/// Eulogies and download items.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an item.
    async fn create_content(&self, item: &ContentItem) -> AppResult<ContentItem>;

    /// Find an item by id.
    async fn find_content(&self, id: Uuid) -> AppResult<Option<ContentItem>>;

    /// All items of a kind, newest first, visible or not.
    async fn list_content(&self, kind: ContentKind) -> AppResult<Vec<ContentItem>>;

    /// Increment the download counter and return the updated item.
    async fn record_download(&self, id: Uuid) -> AppResult<ContentItem>;

    /// Delete an item. Returns the removed item.
    async fn delete_content(&self, id: Uuid) -> AppResult<Option<ContentItem>>;
}

/// One handle per store trait, shared by the services.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Accounts.
    pub accounts: Arc<dyn AccountStore>,
    /// Student profiles.
    pub students: Arc<dyn StudentStore>,
    /// Reset requests.
    pub resets: Arc<dyn ResetStore>,
    /// Eulogies and downloads.
    pub content: Arc<dyn ContentStore>,
}

impl Stores {
    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: &crate::DatabasePool) -> Self {
        let pool = pool.pool();
        Self {
            accounts: Arc::new(crate::AccountRepository::new(pool.clone())),
            students: Arc::new(crate::StudentRepository::new(pool.clone())),
            resets: Arc::new(crate::ResetRepository::new(pool.clone())),
            content: Arc::new(crate::ContentRepository::new(pool.clone())),
        }
    }

    /// A single in-memory store behind every trait.
    pub fn memory(store: Arc<crate::MemoryStore>) -> Self {
        Self {
            accounts: store.clone(),
            students: store.clone(),
            resets: store.clone(),
            content: store,
        }
    }
}
