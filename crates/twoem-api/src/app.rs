//! Application builder: wires stores, blob storage and services into an
//! Axum app.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use twoem_core::AppResult;
use twoem_core::config::AppConfig;
use twoem_core::traits::{BlobStore, Clock};
use twoem_database::Stores;
use twoem_service::ensure_admin;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete application, creating the bootstrap admin if needed.
pub async fn build_app(
    config: AppConfig,
    stores: Stores,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
) -> AppResult<Router> {
    let state = AppState::new(config, stores.clone(), blobs, Arc::clone(&clock))?;

    if let Some(admin) = ensure_admin(
        &state.config.auth.bootstrap_admin,
        stores.accounts.as_ref(),
        &state.credentials,
        clock.as_ref(),
    )
    .await?
    {
        info!(username = %admin.username, "Default admin account is ready");
    }

    Ok(build_router(state))
}
