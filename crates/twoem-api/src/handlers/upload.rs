//! Multipart form reading shared by the upload handlers.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use twoem_core::AppError;

/// Fallback MIME type for parts that carry none.
const OCTET_STREAM: &str = "application/octet-stream";

/// The `file` part of a form.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Client-supplied filename.
    pub filename: String,
    /// Client-supplied MIME type.
    pub content_type: String,
    /// Contents.
    pub data: Bytes,
}

/// A parsed multipart form: one file plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// The `file` part, if sent.
    pub file: Option<FilePart>,
    /// Every other part, read as text.
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Reads every part of the form.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::missing_field("file", format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or(OCTET_STREAM).to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::missing_field("file", format!("Read error: {e}")))?;
                form.file = Some(FilePart {
                    filename,
                    content_type,
                    data,
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::missing_field(&name, format!("Read error: {e}")))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    /// The file part, required.
    pub fn require_file(&mut self) -> Result<FilePart, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::missing_field("file", "A file is required"))
    }

    /// A text field, trimmed, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
