//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// A login identity: either an administrator or a student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Unique login name, case-sensitive as stored.
    pub username: String,
    /// Argon2 password digest. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Email address (optional).
    pub email: Option<String>,
    /// Set until the holder chooses their own password.
    pub is_first_login: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check if this account has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Email address (optional).
    pub email: Option<String>,
}

impl CreateAccount {
    /// Materialize the row that will be inserted.
    ///
    /// New accounts always start flagged as first-login.
    pub fn into_account(self, now: DateTime<Utc>) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: self.username,
            password_hash: self.password_hash,
            role: self.role,
            email: self.email,
            is_first_login: true,
            created_at: now,
            updated_at: now,
        }
    }
}
