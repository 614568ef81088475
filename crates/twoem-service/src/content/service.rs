//! Content service: admin management and public listing of eulogies and
//! download items.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use twoem_core::traits::{BlobStore, Clock};
use twoem_core::{AppError, AppResult, ErrorCode};
use twoem_database::ContentStore;
use twoem_entity::content::{Audience, ContentItem, ContentKind, CreateContentItem};

use crate::context::RequestContext;

use super::expiry::{ContentExpiryManager, Viewer};

/// A file to publish.
#[derive(Debug, Clone)]
pub struct ContentUpload {
    /// Who may see it.
    pub audience: Audience,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

/// An item with its visibility at the time of listing.
#[derive(Debug, Clone, Serialize)]
pub struct ContentSummary {
    /// The stored item.
    #[serde(flatten)]
    pub item: ContentItem,
    /// Whether the item is currently shown.
    pub is_visible: bool,
    /// Whole days left in the window.
    pub days_remaining: i64,
}

/// Manages eulogies and download items.
#[derive(Debug, Clone)]
pub struct ContentService {
    content: Arc<dyn ContentStore>,
    blobs: Arc<dyn BlobStore>,
    expiry: ContentExpiryManager,
    clock: Arc<dyn Clock>,
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(
        content: Arc<dyn ContentStore>,
        blobs: Arc<dyn BlobStore>,
        expiry: ContentExpiryManager,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            content,
            blobs,
            expiry,
            clock,
        }
    }

    /// Publishes an item of `kind` with the kind's default window.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        kind: ContentKind,
        upload: ContentUpload,
    ) -> AppResult<ContentItem> {
        ctx.require_admin()?;
        if upload.title.trim().is_empty() {
            return Err(AppError::missing_field("title", "Title is required"));
        }
        if upload.data.is_empty() {
            return Err(AppError::missing_field("file", "Uploaded file is empty"));
        }

        let item = CreateContentItem {
            kind,
            audience: upload.audience,
            title: upload.title.trim().to_string(),
            description: upload.description,
            filename: upload.filename,
            content_type: upload.content_type,
            size_bytes: upload.data.len() as i64,
            uploaded_by: ctx.account_id,
        }
        .into_item(self.clock.now(), self.expiry.ttl_for(kind));

        self.blobs.put(&item.blob_key, upload.data).await?;
        let item = match self.content.create_content(&item).await {
            Ok(item) => item,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&item.blob_key).await {
                    warn!(blob_key = %item.blob_key, error = %cleanup, "Failed to remove orphaned blob");
                }
                return Err(e);
            }
        };

        info!(
            content_id = %item.id,
            kind = %kind,
            title = %item.title,
            expires_at = %item.expires_at,
            uploaded_by = %ctx.username,
            "Content uploaded"
        );
        Ok(item)
    }

    /// Every item of `kind`, including hidden ones.
    pub async fn admin_list(
        &self,
        ctx: &RequestContext,
        kind: ContentKind,
    ) -> AppResult<Vec<ContentSummary>> {
        ctx.require_admin()?;
        let now = self.clock.now();
        let items = self.content.list_content(kind).await?;
        Ok(items.into_iter().map(|item| self.summarize(item, now)).collect())
    }

    /// Deletes an item of `kind` and its file.
    pub async fn delete(&self, ctx: &RequestContext, kind: ContentKind, id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;
        self.find(kind, id).await?;
        let item = self
            .content
            .delete_content(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.blobs.delete(&item.blob_key).await?;

        info!(content_id = %id, kind = %kind, deleted_by = %ctx.username, "Content deleted");
        Ok(())
    }

    /// Items of `kind` currently visible to `viewer`.
    pub async fn list_visible(
        &self,
        viewer: Viewer,
        kind: ContentKind,
    ) -> AppResult<Vec<ContentSummary>> {
        let now = self.clock.now();
        let items = self.content.list_content(kind).await?;
        Ok(items
            .into_iter()
            .filter(|item| self.expiry.is_visible_to(item, viewer, now))
            .map(|item| self.summarize(item, now))
            .collect())
    }

    /// Fetches the file of a visible item, counting downloads.
    ///
    /// Items outside the viewer's audience are reported as missing; hidden
    /// items fail with `ContentExpired`.
    pub async fn fetch(
        &self,
        viewer: Viewer,
        kind: ContentKind,
        id: Uuid,
    ) -> AppResult<(ContentItem, Bytes)> {
        let item = self.find(kind, id).await?;
        if !viewer.can_see(item.audience) {
            return Err(not_found(id));
        }
        if !self.expiry.is_visible(&item, self.clock.now()) {
            return Err(AppError::new(
                ErrorCode::ContentExpired,
                format!("{kind} {id} is no longer available"),
            ));
        }

        let data = self.blobs.get(&item.blob_key).await?;
        let item = if kind.counts_downloads() {
            self.content.record_download(id).await?
        } else {
            item
        };
        Ok((item, data))
    }

    async fn find(&self, kind: ContentKind, id: Uuid) -> AppResult<ContentItem> {
        self.content
            .find_content(id)
            .await?
            .filter(|item| item.kind == kind)
            .ok_or_else(|| not_found(id))
    }

    fn summarize(&self, item: ContentItem, now: DateTime<Utc>) -> ContentSummary {
        ContentSummary {
            is_visible: self.expiry.is_visible(&item, now),
            days_remaining: self.expiry.days_remaining(&item, now),
            item,
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::new(
        ErrorCode::ContentItemNotFound,
        format!("Content item {id} not found"),
    )
}
