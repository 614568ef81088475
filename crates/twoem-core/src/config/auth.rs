//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential hashing, token, and reset-code configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_minutes: u64,
    /// Clock-skew tolerance applied to `exp` when validating tokens.
    #[serde(default)]
    pub jwt_leeway_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    /// Lifetime of a password reset request in hours.
    #[serde(default = "default_reset_ttl")]
    pub reset_code_ttl_hours: u64,
    /// Administrator created on first start when none exists.
    #[serde(default)]
    pub bootstrap_admin: BootstrapAdminConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_minutes: default_jwt_ttl(),
            jwt_leeway_seconds: 0,
            password_min_length: default_password_min(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            reset_code_ttl_hours: default_reset_ttl(),
            bootstrap_admin: BootstrapAdminConfig::default(),
        }
    }
}

/// Default administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    /// Whether to create the admin at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Admin username.
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Admin email.
    #[serde(default = "default_admin_email")]
    pub email: String,
    /// Initial admin password. The account is flagged first-login.
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            username: default_admin_username(),
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_jwt_ttl() -> u64 {
    30
}

fn default_password_min() -> usize {
    8
}

fn default_argon2_memory() -> u32 {
    19_456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_reset_ttl() -> u64 {
    24
}

fn default_true() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@twoem.com".to_string()
}

fn default_admin_password() -> String {
    "CHANGE_ME_ADMIN".to_string()
}
