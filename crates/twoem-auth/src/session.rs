//! Session tokens: issuance and validation into a current identity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use twoem_core::config::auth::AuthConfig;
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::AccountStore;
use twoem_entity::account::{Account, Role};

use crate::jwt::{JwtDecoder, JwtEncoder};

/// A freshly signed bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// The signed JWT.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// When the token stops validating.
    pub expires_at: DateTime<Utc>,
}

/// The caller behind a validated token, as the account stands now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account ID.
    pub account_id: Uuid,
    /// Current username.
    pub username: String,
    /// Current role.
    pub role: Role,
    /// Whether the account still uses its initial password.
    pub is_first_login: bool,
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            role: account.role,
            is_first_login: account.is_first_login,
        }
    }
}

/// Issues and validates stateless HS256 session tokens.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    accounts: Arc<dyn AccountStore>,
}

impl SessionIssuer {
    /// Creates an issuer signing with `auth.jwt_secret`.
    pub fn new(config: &AuthConfig, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            accounts,
        }
    }

    /// Signs a token for `account`.
    pub fn issue(&self, account: &Account) -> AppResult<IssuedToken> {
        let (access_token, expires_at) = self.encoder.encode_at(account, Utc::now())?;
        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
            expires_at,
        })
    }

    /// Validates a token and resolves its subject.
    ///
    /// `InvalidToken` for malformed or forged tokens, `ExpiredToken` past
    /// expiry, `UnknownSubject` when the account no longer exists.
    pub async fn validate(&self, token: &str) -> AppResult<Identity> {
        let claims = self.decoder.decode(token)?;
        let account = self
            .accounts
            .find_account(claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::UnknownSubject,
                    "Token subject no longer exists",
                )
            })?;
        Ok(Identity::from(&account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fast_config;
    use twoem_database::{MemoryStore, StudentStore};
    use twoem_entity::account::CreateAccount;
    use twoem_entity::student::CreateStudentProfile;

    #[tokio::test]
    async fn test_issue_then_validate() {
        let store = Arc::new(MemoryStore::new());
        let issuer = SessionIssuer::new(&fast_config(), store.clone());
        let account = CreateAccount {
            username: "admin".into(),
            password_hash: "x".into(),
            role: Role::Admin,
            email: None,
        }
        .into_account(Utc::now());
        store.create_account(&account).await.unwrap();

        let token = issuer.issue(&account).unwrap();
        assert_eq!(token.token_type, "bearer");
        let identity = issuer.validate(&token.access_token).await.unwrap();
        assert_eq!(identity.account_id, account.id);
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_deleted_subject_is_unknown() {
        let store = Arc::new(MemoryStore::new());
        let issuer = SessionIssuer::new(&fast_config(), store.clone());
        let account = CreateAccount {
            username: "jdoe".into(),
            password_hash: "x".into(),
            role: Role::Student,
            email: None,
        }
        .into_account(Utc::now());
        let profile = CreateStudentProfile {
            account_id: account.id,
            full_name: "J Doe".into(),
            id_number: "1".into(),
            email: None,
            phone: None,
        }
        .into_profile(Utc::now());
        store.create_student(&account, &profile).await.unwrap();

        let token = issuer.issue(&account).unwrap();
        store.delete_student(profile.id, Utc::now()).await.unwrap();
        let err = issuer.validate(&token.access_token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSubject);
    }
}
