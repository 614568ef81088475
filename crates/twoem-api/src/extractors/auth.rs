//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header, validates it, and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use twoem_core::{AppError, ErrorCode};
use twoem_service::{RequestContext, Viewer};

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::new(ErrorCode::InvalidToken, "Missing or malformed bearer token")
                })?;

        let identity = state.sessions.validate(bearer.token()).await?;
        Ok(AuthUser(RequestContext::new(&identity)))
    }
}

/// Who is asking for public content.
///
/// Requests without an Authorization header are anonymous; a header that
/// is present must carry a valid token.
#[derive(Debug, Clone, Copy)]
pub struct ContentViewer(pub Viewer);

impl FromRequestParts<AppState> for ContentViewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(Self(Viewer::Anonymous));
        }
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(Self(Viewer::Authenticated(user.role)))
    }
}
