//! Content item repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_entity::content::{ContentItem, ContentKind};

use super::db_error;
use crate::store::ContentStore;

/// Repository for eulogies and download items.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Create a new content repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for ContentRepository {
    async fn create_content(&self, item: &ContentItem) -> AppResult<ContentItem> {
        sqlx::query_as::<_, ContentItem>(
            "INSERT INTO content_items (id, kind, audience, title, description, filename, \
                                        content_type, blob_key, size_bytes, uploaded_by, \
                                        uploaded_at, expires_at, is_active, download_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(item.id)
        .bind(item.kind)
        .bind(item.audience)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.filename)
        .bind(&item.content_type)
        .bind(&item.blob_key)
        .bind(item.size_bytes)
        .bind(item.uploaded_by)
        .bind(item.uploaded_at)
        .bind(item.expires_at)
        .bind(item.is_active)
        .bind(item.download_count)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create content item"))
    }

    async fn find_content(&self, id: Uuid) -> AppResult<Option<ContentItem>> {
        sqlx::query_as::<_, ContentItem>("SELECT * FROM content_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find content item"))
    }

    async fn list_content(&self, kind: ContentKind) -> AppResult<Vec<ContentItem>> {
        sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE kind = $1 ORDER BY uploaded_at DESC",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list content items"))
    }

    async fn record_download(&self, id: Uuid) -> AppResult<ContentItem> {
        sqlx::query_as::<_, ContentItem>(
            "UPDATE content_items SET download_count = download_count + 1 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to record download"))?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ContentItemNotFound,
                format!("Content item {id} not found"),
            )
        })
    }

    async fn delete_content(&self, id: Uuid) -> AppResult<Option<ContentItem>> {
        sqlx::query_as::<_, ContentItem>("DELETE FROM content_items WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to delete content item"))
    }
}
