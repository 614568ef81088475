//! Admin handlers for student records.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;

use twoem_entity::student::{AcademicPatch, FinancePatch, ProfilePatch};
use twoem_service::StudentView;
use twoem_service::student::CertificateUpload;

use crate::dto::request::CreateStudentBody;
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, JsonBody, ValidatedJson};
use crate::handlers::file_response;
use crate::handlers::upload::UploadForm;
use crate::state::AppState;

/// POST /api/admin/students
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateStudentBody>,
) -> Result<(StatusCode, Json<StudentView>), ApiError> {
    let view = state
        .admin_student_service
        .create(&auth, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/admin/students
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<StudentView>>, ApiError> {
    Ok(Json(state.admin_student_service.list(&auth).await?))
}

/// GET /api/admin/students/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<StudentView>, ApiError> {
    Ok(Json(state.admin_student_service.get(&auth, id).await?))
}

/// DELETE /api/admin/students/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    state.admin_student_service.delete(&auth, id).await?;
    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

/// PUT /api/admin/students/{id}/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> Result<Json<StudentView>, ApiError> {
    let view = state
        .admin_student_service
        .update_profile(&auth, id, patch)
        .await?;
    Ok(Json(view))
}

/// PUT /api/admin/students/{id}/academic
pub async fn update_academic(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(patch): JsonBody<AcademicPatch>,
) -> Result<Json<StudentView>, ApiError> {
    let view = state
        .admin_student_service
        .update_academic(&auth, id, patch)
        .await?;
    Ok(Json(view))
}

/// PUT /api/admin/students/{id}/finance
pub async fn update_finance(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    JsonBody(patch): JsonBody<FinancePatch>,
) -> Result<Json<StudentView>, ApiError> {
    let view = state
        .admin_student_service
        .update_finance(&auth, id, patch)
        .await?;
    Ok(Json(view))
}

/// POST /api/admin/students/{id}/certificate
pub async fn upload_certificate(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    multipart: Multipart,
) -> Result<Json<StudentView>, ApiError> {
    let file = UploadForm::read(multipart).await?.require_file()?;
    let view = state
        .admin_student_service
        .upload_certificate(
            &auth,
            id,
            CertificateUpload {
                filename: file.filename,
                content_type: file.content_type,
                data: file.data,
            },
        )
        .await?;
    Ok(Json(view))
}

/// GET /api/admin/students/{id}/certificate
pub async fn download_certificate(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Response, ApiError> {
    let (certificate, data) = state
        .admin_student_service
        .fetch_certificate(&auth, id)
        .await?;
    Ok(file_response(&certificate.filename, &certificate.content_type, data)?)
}
