//! Certificate metadata. The bytes live in the blob store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded certificate. A student has at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    /// Owning student profile.
    pub student_id: Uuid,
    /// Key of the blob holding the file.
    #[serde(skip_serializing)]
    pub blob_key: String,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Admin account that uploaded it.
    pub uploaded_by: Uuid,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl Certificate {
    /// Blob key for one upload of a student's certificate.
    ///
    /// Each upload gets its own key so a replacement never overwrites the
    /// file the stored metadata still points at.
    pub fn blob_key_for(student_id: Uuid, upload_id: Uuid) -> String {
        format!("certificates/{student_id}/{upload_id}")
    }
}
