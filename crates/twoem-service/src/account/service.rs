//! Account service: login, identity lookup and self-service password change.

use std::sync::Arc;

use tracing::info;

use twoem_auth::{CredentialStore, IssuedToken, SessionIssuer};
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::AccountStore;
use twoem_entity::account::Account;

use crate::context::RequestContext;

/// Handles login and operations on the caller's own account.
#[derive(Debug, Clone)]
pub struct AccountService {
    /// Account store.
    accounts: Arc<dyn AccountStore>,
    /// Password digests.
    credentials: Arc<CredentialStore>,
    /// Token issuer.
    sessions: Arc<SessionIssuer>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        credentials: Arc<CredentialStore>,
        sessions: Arc<SessionIssuer>,
    ) -> Self {
        Self {
            accounts,
            credentials,
            sessions,
        }
    }

    /// Authenticates a username and password and issues a session token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<IssuedToken> {
        let account = self.credentials.authenticate(username, password).await?;
        let token = self.sessions.issue(&account)?;
        info!(
            account_id = %account.id,
            username = %account.username,
            role = %account.role,
            "User logged in"
        );
        Ok(token)
    }

    /// Returns the caller's account as it currently stands.
    pub async fn whoami(&self, ctx: &RequestContext) -> AppResult<Account> {
        self.accounts
            .find_account(ctx.account_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::AccountNotFound, "Account not found"))
    }

    /// Replaces the caller's password. A valid token is the only proof
    /// required; the new password must still meet the policy.
    ///
    /// Clears the first-login flag.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        new_password: &str,
    ) -> AppResult<Account> {
        self.credentials
            .set_password(ctx.account_id, new_password)
            .await
    }
}
