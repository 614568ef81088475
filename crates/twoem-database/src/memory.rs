//! In-memory implementation of every store trait.
//!
//! Backed by `DashMap`s. Each mutation runs under the entry lock of the
//! record it changes, which gives the same per-record atomicity as the
//! PostgreSQL repositories. Used by tests and by `database.backend = "memory"`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_entity::account::{Account, Role};
use twoem_entity::content::{ContentItem, ContentKind};
use twoem_entity::reset::model::{
    APPROVED_RESPONSE, REJECTED_RESPONSE, STUDENT_REMOVED_RESPONSE, SUPERSEDED_RESPONSE,
};
use twoem_entity::reset::{PasswordResetRequest, ResetStatus};
use twoem_entity::student::{
    AcademicPatch, Certificate, FinancePatch, ProfilePatch, StudentProfile,
};

use crate::store::{AccountStore, ContentStore, ResetStore, StudentStore};

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    usernames: DashMap<String, Uuid>,
    students: DashMap<Uuid, StudentProfile>,
    student_by_account: DashMap<Uuid, Uuid>,
    resets: DashMap<Uuid, PasswordResetRequest>,
    reset_creation: Mutex<()>,
    content: DashMap<Uuid, ContentItem>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn duplicate(username: &str) -> AppError {
        AppError::new(
            ErrorCode::DuplicateUsername,
            format!("Username '{username}' already exists"),
        )
    }

    fn student_not_found(id: Uuid) -> AppError {
        AppError::new(
            ErrorCode::StudentProfileNotFound,
            format!("Student {id} not found"),
        )
    }

    fn transition(
        &self,
        id: Uuid,
        target: ResetStatus,
        response: &str,
        code: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest> {
        let mut request = self.resets.get_mut(&id).ok_or_else(|| {
            AppError::new(
                ErrorCode::ResetRequestNotFound,
                format!("Reset request {id} not found"),
            )
        })?;

        if !request.status.can_transition_to(target) {
            return Err(AppError::new(
                ErrorCode::InvalidTransition,
                format!(
                    "Reset request {id} is {} and cannot become {target}",
                    request.status
                ),
            ));
        }

        request.status = target;
        request.responded_at = Some(now);
        request.admin_response = Some(response.to_string());
        if let Some(code) = code {
            request.code = code.to_string();
        }
        Ok(request.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: &Account) -> AppResult<Account> {
        match self.usernames.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(Self::duplicate(&account.username)),
            Entry::Vacant(slot) => {
                self.accounts.insert(account.id, account.clone());
                slot.insert(account.id);
                Ok(account.clone())
            }
        }
    }

    async fn find_account(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let id = self.usernames.get(username).map(|e| *e.value());
        Ok(id.and_then(|id| self.accounts.get(&id).map(|a| a.clone())))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Account> {
        let mut account = self.accounts.get_mut(&id).ok_or_else(|| {
            AppError::new(ErrorCode::AccountNotFound, format!("Account {id} not found"))
        })?;
        account.password_hash = password_hash.to_string();
        account.is_first_login = false;
        account.updated_at = now;
        Ok(account.clone())
    }

    async fn count_by_role(&self, role: Role) -> AppResult<u64> {
        Ok(self.accounts.iter().filter(|a| a.role == role).count() as u64)
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn create_student(
        &self,
        account: &Account,
        profile: &StudentProfile,
    ) -> AppResult<StudentProfile> {
        match self.usernames.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(Self::duplicate(&account.username)),
            Entry::Vacant(slot) => {
                self.accounts.insert(account.id, account.clone());
                self.students.insert(profile.id, profile.clone());
                self.student_by_account.insert(account.id, profile.id);
                slot.insert(account.id);
                Ok(profile.clone())
            }
        }
    }

    async fn find_student(&self, id: Uuid) -> AppResult<Option<StudentProfile>> {
        Ok(self.students.get(&id).map(|p| p.clone()))
    }

    async fn find_student_by_account(
        &self,
        account_id: Uuid,
    ) -> AppResult<Option<StudentProfile>> {
        let id = self.student_by_account.get(&account_id).map(|e| *e.value());
        Ok(id.and_then(|id| self.students.get(&id).map(|p| p.clone())))
    }

    async fn list_students(&self) -> AppResult<Vec<StudentProfile>> {
        let mut profiles: Vec<StudentProfile> =
            self.students.iter().map(|p| p.value().clone()).collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile> {
        let mut profile = self
            .students
            .get_mut(&id)
            .ok_or_else(|| Self::student_not_found(id))?;
        let next = profile.apply(patch, now)?;
        *profile = next.clone();
        Ok(next)
    }

    async fn update_academic(
        &self,
        id: Uuid,
        patch: &AcademicPatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile> {
        let mut profile = self
            .students
            .get_mut(&id)
            .ok_or_else(|| Self::student_not_found(id))?;
        profile.academic = profile.academic.apply(patch, now)?;
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn update_finance(
        &self,
        id: Uuid,
        patch: &FinancePatch,
        now: DateTime<Utc>,
    ) -> AppResult<StudentProfile> {
        let mut profile = self
            .students
            .get_mut(&id)
            .ok_or_else(|| Self::student_not_found(id))?;
        profile.finance = profile.finance.apply(patch, now)?;
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn set_certificate(&self, certificate: &Certificate) -> AppResult<StudentProfile> {
        let mut profile = self
            .students
            .get_mut(&certificate.student_id)
            .ok_or_else(|| Self::student_not_found(certificate.student_id))?;
        profile.certificate = Some(certificate.clone());
        Ok(profile.clone())
    }

    async fn delete_student(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<StudentProfile>> {
        let _guard = self
            .reset_creation
            .lock()
            .map_err(|_| AppError::internal("Reset request lock poisoned"))?;

        let Some((_, profile)) = self.students.remove(&id) else {
            return Ok(None);
        };
        self.student_by_account.remove(&profile.account_id);
        if let Some((_, account)) = self.accounts.remove(&profile.account_id) {
            self.usernames.remove(&account.username);
            for mut request in self.resets.iter_mut() {
                if request.student_username == account.username
                    && matches!(request.status, ResetStatus::Pending | ResetStatus::Approved)
                {
                    request.status = ResetStatus::Rejected;
                    request.responded_at = Some(now);
                    request.admin_response = Some(STUDENT_REMOVED_RESPONSE.to_string());
                }
            }
        }
        Ok(Some(profile))
    }
}

#[async_trait]
impl ResetStore for MemoryStore {
    async fn create_superseding(
        &self,
        request: &PasswordResetRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest> {
        let _guard = self
            .reset_creation
            .lock()
            .map_err(|_| AppError::internal("Reset request lock poisoned"))?;

        for mut earlier in self.resets.iter_mut() {
            if earlier.student_username == request.student_username
                && earlier.status == ResetStatus::Pending
            {
                earlier.status = ResetStatus::Rejected;
                earlier.responded_at = Some(now);
                earlier.admin_response = Some(SUPERSEDED_RESPONSE.to_string());
            }
        }
        self.resets.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn find_reset(&self, id: Uuid) -> AppResult<Option<PasswordResetRequest>> {
        Ok(self.resets.get(&id).map(|r| r.clone()))
    }

    async fn list_pending_resets(&self) -> AppResult<Vec<PasswordResetRequest>> {
        let mut pending: Vec<PasswordResetRequest> = self
            .resets
            .iter()
            .filter(|r| r.status == ResetStatus::Pending)
            .map(|r| r.value().clone())
            .collect();
        pending.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(pending)
    }

    async fn approve_reset(
        &self,
        id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PasswordResetRequest> {
        self.transition(id, ResetStatus::Approved, APPROVED_RESPONSE, Some(code), now)
    }

    async fn reject_reset(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<PasswordResetRequest> {
        self.transition(id, ResetStatus::Rejected, REJECTED_RESPONSE, None, now)
    }

    async fn redeem_reset(
        &self,
        username: &str,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Account> {
        let candidate = self
            .resets
            .iter()
            .find(|r| r.is_redeemable(username, code, now))
            .map(|r| *r.key());
        let id = candidate.ok_or_else(AppError::invalid_or_expired_code)?;

        let mut request = self
            .resets
            .get_mut(&id)
            .ok_or_else(AppError::invalid_or_expired_code)?;
        // Re-check under the entry lock; a concurrent redemption may have won.
        if !request.is_redeemable(username, code, now) {
            return Err(AppError::invalid_or_expired_code());
        }

        let account_id = self
            .usernames
            .get(username)
            .map(|e| *e.value())
            .ok_or_else(AppError::invalid_or_expired_code)?;
        let mut account = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(AppError::invalid_or_expired_code)?;

        account.password_hash = password_hash.to_string();
        account.is_first_login = false;
        account.updated_at = now;
        request.status = ResetStatus::Used;
        Ok(account.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_content(&self, item: &ContentItem) -> AppResult<ContentItem> {
        self.content.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn find_content(&self, id: Uuid) -> AppResult<Option<ContentItem>> {
        Ok(self.content.get(&id).map(|c| c.clone()))
    }

    async fn list_content(&self, kind: ContentKind) -> AppResult<Vec<ContentItem>> {
        let mut items: Vec<ContentItem> = self
            .content
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.value().clone())
            .collect();
        items.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(items)
    }

    async fn record_download(&self, id: Uuid) -> AppResult<ContentItem> {
        let mut item = self.content.get_mut(&id).ok_or_else(|| {
            AppError::new(
                ErrorCode::ContentItemNotFound,
                format!("Content item {id} not found"),
            )
        })?;
        item.download_count += 1;
        Ok(item.clone())
    }

    async fn delete_content(&self, id: Uuid) -> AppResult<Option<ContentItem>> {
        Ok(self.content.remove(&id).map(|(_, item)| item))
    }
}
