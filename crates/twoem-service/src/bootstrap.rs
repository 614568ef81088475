//! Startup bootstrap of the default administrator.

use tracing::{info, warn};

use twoem_auth::CredentialStore;
use twoem_core::config::auth::BootstrapAdminConfig;
use twoem_core::traits::Clock;
use twoem_core::AppResult;
use twoem_database::AccountStore;
use twoem_entity::account::{Account, CreateAccount, Role};

/// Creates the configured administrator when no admin account exists.
///
/// Returns the created account, or `None` when bootstrap is disabled or an
/// admin is already present.
pub async fn ensure_admin(
    config: &BootstrapAdminConfig,
    accounts: &dyn AccountStore,
    credentials: &CredentialStore,
    clock: &dyn Clock,
) -> AppResult<Option<Account>> {
    if !config.enabled {
        return Ok(None);
    }
    if accounts.count_by_role(Role::Admin).await? > 0 {
        return Ok(None);
    }
    if credentials.check_policy(&config.password).is_err() {
        warn!("Bootstrap admin password does not meet the password policy");
    }

    let mut account = CreateAccount {
        username: config.username.clone(),
        password_hash: credentials.hash(&config.password).await?,
        role: Role::Admin,
        email: Some(config.email.clone()),
    }
    .into_account(clock.now());
    account.is_first_login = false;

    let account = accounts.create_account(&account).await?;
    info!(account_id = %account.id, username = %account.username, "Bootstrap admin created");
    Ok(Some(account))
}
