//! Eulogy and download handlers, admin and public.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;

use twoem_core::AppError;
use twoem_entity::content::{Audience, ContentItem, ContentKind};
use twoem_service::content::{ContentSummary, ContentUpload};

use crate::dto::request::parse_audience;
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ContentViewer, IdPath};
use crate::handlers::file_response;
use crate::handlers::upload::UploadForm;
use crate::state::AppState;

async fn upload(
    state: AppState,
    auth: AuthUser,
    kind: ContentKind,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ContentItem>), ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    let title = form
        .text("title")
        .ok_or_else(|| AppError::missing_field("title", "Title is required"))?;
    let audience = match form.text("audience").or_else(|| form.text("file_type")) {
        Some(raw) => parse_audience(&raw).ok_or_else(|| {
            AppError::out_of_range("audience", "Audience must be 'public' or 'students'")
        })?,
        None => Audience::default(),
    };

    let item = state
        .content_service
        .upload(
            &auth,
            kind,
            ContentUpload {
                audience,
                title,
                description: form.text("description"),
                filename: file.filename,
                content_type: file.content_type,
                data: file.data,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn fetch(
    state: AppState,
    viewer: ContentViewer,
    kind: ContentKind,
    id: uuid::Uuid,
) -> Result<Response, ApiError> {
    let (item, data) = state.content_service.fetch(viewer.0, kind, id).await?;
    Ok(file_response(&item.filename, &item.content_type, data)?)
}

/// POST /api/admin/eulogies
pub async fn upload_eulogy(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ContentItem>), ApiError> {
    upload(state, auth, ContentKind::Eulogy, multipart).await
}

/// POST /api/admin/downloads
pub async fn upload_download(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ContentItem>), ApiError> {
    upload(state, auth, ContentKind::Download, multipart).await
}

/// GET /api/admin/eulogies
pub async fn admin_list_eulogies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    Ok(Json(state.content_service.admin_list(&auth, ContentKind::Eulogy).await?))
}

/// GET /api/admin/downloads
pub async fn admin_list_downloads(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    Ok(Json(state.content_service.admin_list(&auth, ContentKind::Download).await?))
}

/// DELETE /api/admin/eulogies/{id}
pub async fn delete_eulogy(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .content_service
        .delete(&auth, ContentKind::Eulogy, id)
        .await?;
    Ok(Json(MessageResponse::new("Eulogy deleted successfully")))
}

/// DELETE /api/admin/downloads/{id}
pub async fn delete_download(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .content_service
        .delete(&auth, ContentKind::Download, id)
        .await?;
    Ok(Json(MessageResponse::new("Download deleted successfully")))
}

/// GET /api/eulogies
pub async fn list_eulogies(
    State(state): State<AppState>,
    viewer: ContentViewer,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    Ok(Json(
        state
            .content_service
            .list_visible(viewer.0, ContentKind::Eulogy)
            .await?,
    ))
}

/// GET /api/downloads
pub async fn list_downloads(
    State(state): State<AppState>,
    viewer: ContentViewer,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    Ok(Json(
        state
            .content_service
            .list_visible(viewer.0, ContentKind::Download)
            .await?,
    ))
}

/// GET /api/eulogies/{id}/download
pub async fn download_eulogy(
    State(state): State<AppState>,
    viewer: ContentViewer,
    IdPath(id): IdPath,
) -> Result<Response, ApiError> {
    fetch(state, viewer, ContentKind::Eulogy, id).await
}

/// GET /api/downloads/{id}/download
pub async fn download_download(
    State(state): State<AppState>,
    viewer: ContentViewer,
    IdPath(id): IdPath,
) -> Result<Response, ApiError> {
    fetch(state, viewer, ContentKind::Download, id).await
}
