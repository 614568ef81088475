//! Credential issuance and verification.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use twoem_core::config::auth::AuthConfig;
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::AccountStore;
use twoem_entity::account::Account;

use crate::password::{PasswordHasher, PasswordValidator};

/// Plaintext whose digest is verified when a login names an unknown user.
const DUMMY_PASSWORD: &str = "twoem-timing-equalizer-0";

/// Owns password digests: hashing, verification and replacement.
///
/// Argon2 runs on the blocking thread pool so request workers stay free.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    dummy_digest: Arc<str>,
}

impl CredentialStore {
    /// Creates the store, precomputing the digest used for unknown users.
    pub fn new(config: &AuthConfig, accounts: Arc<dyn AccountStore>) -> AppResult<Self> {
        let hasher = PasswordHasher::new(config)?;
        let dummy_digest = hasher.hash_password(DUMMY_PASSWORD)?.into();
        Ok(Self {
            accounts,
            hasher,
            validator: PasswordValidator::new(config),
            dummy_digest,
        })
    }

    /// Validates a candidate password against the policy.
    pub fn check_policy(&self, password: &str) -> AppResult<()> {
        self.validator.validate(password)
    }

    /// Hashes a password with a fresh salt.
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
    }

    /// Verifies a password against a digest.
    pub async fn verify(&self, password: &str, digest: &str) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &digest))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))?
    }

    /// Resolves a username and password to an account.
    ///
    /// Unknown user and wrong password fail identically with
    /// `InvalidCredentials`, and both cost one Argon2 verification.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Account> {
        let account = self.accounts.find_account_by_username(username).await?;
        let digest = match &account {
            Some(a) => a.password_hash.clone(),
            None => self.dummy_digest.to_string(),
        };

        let matches = self.verify(password, &digest).await?;
        match account {
            Some(a) if matches => Ok(a),
            _ => {
                warn!(username = %username, "Failed login attempt");
                Err(AppError::new(
                    ErrorCode::InvalidCredentials,
                    "Invalid username or password",
                ))
            }
        }
    }

    /// Replaces an account's password and clears its first-login flag.
    pub async fn set_password(&self, account_id: Uuid, new_password: &str) -> AppResult<Account> {
        self.check_policy(new_password)?;
        let digest = self.hash(new_password).await?;
        let account = self
            .accounts
            .set_password(account_id, &digest, Utc::now())
            .await?;
        info!(account_id = %account_id, "Password changed");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fast_config;
    use twoem_database::MemoryStore;
    use twoem_entity::account::{CreateAccount, Role};

    async fn setup() -> (CredentialStore, Account) {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let creds = CredentialStore::new(&fast_config(), store.clone()).unwrap();
        let account = CreateAccount {
            username: "jdoe".into(),
            password_hash: creds.hash("Initial123").await.unwrap(),
            role: Role::Student,
            email: None,
        }
        .into_account(Utc::now());
        let account = store.create_account(&account).await.unwrap();
        (creds, account)
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (creds, account) = setup().await;
        let found = creds.authenticate("jdoe", "Initial123").await.unwrap();
        assert_eq!(found.id, account.id);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let (creds, _) = setup().await;
        let wrong = creds.authenticate("jdoe", "Wrong12345").await.unwrap_err();
        let unknown = creds.authenticate("ghost", "Initial123").await.unwrap_err();
        assert_eq!(wrong.code, ErrorCode::InvalidCredentials);
        assert_eq!(unknown.code, ErrorCode::InvalidCredentials);
        assert_eq!(wrong.message, unknown.message);
    }

    #[tokio::test]
    async fn test_set_password_clears_first_login() {
        let (creds, account) = setup().await;
        assert!(account.is_first_login);
        let updated = creds.set_password(account.id, "Changed456").await.unwrap();
        assert!(!updated.is_first_login);
        assert!(creds.authenticate("jdoe", "Initial123").await.is_err());
        assert!(creds.authenticate("jdoe", "Changed456").await.is_ok());
    }

    #[tokio::test]
    async fn test_set_password_enforces_policy() {
        let (creds, account) = setup().await;
        let err = creds.set_password(account.id, "short").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfRange);
    }
}
