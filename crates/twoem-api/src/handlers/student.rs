//! Student self-service handlers.

use axum::Json;
use axum::extract::State;
use axum::response::Response;

use twoem_entity::content::ContentKind;
use twoem_entity::student::ParentContacts;
use twoem_service::content::ContentSummary;
use twoem_service::{StudentView, Viewer};

use crate::error::ApiError;
use crate::extractors::{AuthUser, JsonBody};
use crate::handlers::file_response;
use crate::state::AppState;

/// GET /api/student/profile
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<StudentView>, ApiError> {
    Ok(Json(state.student_service.profile(&auth).await?))
}

/// PUT /api/student/parent-contacts
pub async fn update_parent_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(contacts): JsonBody<ParentContacts>,
) -> Result<Json<StudentView>, ApiError> {
    let view = state
        .student_service
        .update_parent_contacts(&auth, contacts)
        .await?;
    Ok(Json(view))
}

/// GET /api/student/certificate
pub async fn download_certificate(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    let (certificate, data) = state.student_service.download_certificate(&auth).await?;
    Ok(file_response(&certificate.filename, &certificate.content_type, data)?)
}

/// GET /api/student/downloads
pub async fn downloads(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    let items = state
        .content_service
        .list_visible(Viewer::Authenticated(auth.role), ContentKind::Download)
        .await?;
    Ok(Json(items))
}
