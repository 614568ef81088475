//! Auth handlers: login, whoami, password change and the student side of
//! the reset workflow.

use axum::Json;
use axum::extract::State;

use twoem_auth::IssuedToken;

use crate::dto::request::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
};
use crate::dto::response::{AccountResponse, MessageResponse, ResetRequestedResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let token = state
        .account_service
        .login(&req.username, &req.password)
        .await?;
    Ok(Json(token))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.account_service.whoami(&auth).await?;
    Ok(Json(account.into()))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .account_service
        .change_password(&auth, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ResetRequestedResponse>, ApiError> {
    let request = state.reset_workflow.request(&req.username).await?;
    Ok(Json(ResetRequestedResponse {
        message: "Password reset request submitted. Please contact admin for approval."
            .to_string(),
        request_id: request.id,
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .reset_workflow
        .redeem(&req.username, &req.reset_code, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}
