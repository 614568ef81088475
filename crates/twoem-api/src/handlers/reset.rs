//! Admin handlers for the password reset queue.

use axum::Json;
use axum::extract::State;

use twoem_service::reset::ApprovedReset;

use crate::dto::response::ResetRequestResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath};
use crate::state::AppState;

/// GET /api/admin/password-resets
pub async fn list_pending(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ResetRequestResponse>>, ApiError> {
    let pending = state.reset_workflow.list_pending(&auth).await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// PUT /api/admin/password-resets/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ApprovedReset>, ApiError> {
    let approved = state.reset_workflow.approve(&auth, id).await?;
    Ok(Json(approved))
}

/// PUT /api/admin/password-resets/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ResetRequestResponse>, ApiError> {
    let rejected = state.reset_workflow.reject(&auth, id).await?;
    Ok(Json(rejected.into()))
}
