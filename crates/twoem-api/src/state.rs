//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use twoem_auth::{CredentialStore, SessionIssuer};
use twoem_core::AppResult;
use twoem_core::config::AppConfig;
use twoem_core::traits::{BlobStore, Clock};
use twoem_database::Stores;
use twoem_service::{
    AccountService, AdminStudentService, ContentExpiryManager, ContentService,
    PasswordResetWorkflow, StudentService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Auth ─────────────────────────────────────────────────
    /// Password digests
    pub credentials: Arc<CredentialStore>,
    /// Token issuer and validator
    pub sessions: Arc<SessionIssuer>,

    // ── Services ─────────────────────────────────────────────
    /// Login and own-account operations
    pub account_service: Arc<AccountService>,
    /// Password reset workflow
    pub reset_workflow: Arc<PasswordResetWorkflow>,
    /// Admin student management
    pub admin_student_service: Arc<AdminStudentService>,
    /// Student self-service
    pub student_service: Arc<StudentService>,
    /// Eulogies and downloads
    pub content_service: Arc<ContentService>,
}

impl AppState {
    /// Wires every service onto the given stores.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let credentials = Arc::new(CredentialStore::new(
            &config.auth,
            Arc::clone(&stores.accounts),
        )?);
        let sessions = Arc::new(SessionIssuer::new(
            &config.auth,
            Arc::clone(&stores.accounts),
        ));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&stores.accounts),
            Arc::clone(&credentials),
            Arc::clone(&sessions),
        ));
        let reset_workflow = Arc::new(PasswordResetWorkflow::new(
            &config.auth,
            Arc::clone(&stores.accounts),
            Arc::clone(&stores.resets),
            Arc::clone(&credentials),
            Arc::clone(&clock),
        ));
        let admin_student_service = Arc::new(AdminStudentService::new(
            Arc::clone(&stores.accounts),
            Arc::clone(&stores.students),
            Arc::clone(&blobs),
            Arc::clone(&credentials),
            Arc::clone(&clock),
        ));
        let student_service = Arc::new(StudentService::new(
            Arc::clone(&stores.students),
            Arc::clone(&blobs),
            Arc::clone(&clock),
        ));
        let content_service = Arc::new(ContentService::new(
            Arc::clone(&stores.content),
            blobs,
            ContentExpiryManager::new(&config.content),
            clock,
        ));

        Ok(Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            credentials,
            sessions,
            account_service,
            reset_workflow,
            admin_student_service,
            student_service,
            content_service,
        })
    }
}
