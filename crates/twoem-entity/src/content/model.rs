//! Content item entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// What a content item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A memorial notice, visible for a short window.
    Eulogy,
    /// A downloadable document or installer.
    Download,
}

impl ContentKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eulogy => "eulogy",
            Self::Download => "download",
        }
    }

    /// Whether fetches of this kind are counted.
    pub fn counts_downloads(&self) -> bool {
        matches!(self, Self::Download)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who may see a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_audience", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Anyone, without logging in.
    #[default]
    Public,
    /// Logged-in students only.
    Students,
}

/// An uploaded eulogy or download item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentItem {
    /// Unique item identifier.
    pub id: Uuid,
    /// Eulogy or download.
    pub kind: ContentKind,
    /// Audience.
    pub audience: Audience,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Key of the blob holding the file.
    #[serde(skip_serializing)]
    pub blob_key: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Admin account that uploaded it.
    pub uploaded_by: Uuid,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// End of the visibility window.
    pub expires_at: DateTime<Utc>,
    /// Cleared when an admin withdraws the item.
    pub is_active: bool,
    /// Successful fetches; only download items are counted.
    pub download_count: i64,
}

/// Data required to create a content item.
#[derive(Debug, Clone)]
pub struct CreateContentItem {
    /// Eulogy or download.
    pub kind: ContentKind,
    /// Audience.
    pub audience: Audience,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Uploading admin.
    pub uploaded_by: Uuid,
}

impl CreateContentItem {
    /// Materialize the row with a visibility window of `ttl` from `now`.
    pub fn into_item(self, now: DateTime<Utc>, ttl: Duration) -> ContentItem {
        let id = Uuid::new_v4();
        ContentItem {
            id,
            kind: self.kind,
            audience: self.audience,
            title: self.title,
            description: self.description,
            filename: self.filename,
            content_type: self.content_type,
            blob_key: format!("{}/{id}", self.kind),
            size_bytes: self.size_bytes,
            uploaded_by: self.uploaded_by,
            uploaded_at: now,
            expires_at: now + ttl,
            is_active: true,
            download_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_item_sets_window() {
        let now = Utc::now();
        let item = CreateContentItem {
            kind: ContentKind::Eulogy,
            audience: Audience::Public,
            title: "In memory".into(),
            description: None,
            filename: "notice.pdf".into(),
            content_type: "application/pdf".into(),
            size_bytes: 10,
            uploaded_by: Uuid::new_v4(),
        }
        .into_item(now, Duration::days(7));
        assert_eq!(item.expires_at, now + Duration::days(7));
        assert!(item.is_active);
        assert_eq!(item.download_count, 0);
        assert!(item.blob_key.starts_with("eulogy/"));
    }

    #[test]
    fn test_only_downloads_are_counted() {
        assert!(ContentKind::Download.counts_downloads());
        assert!(!ContentKind::Eulogy.counts_downloads());
    }
}
