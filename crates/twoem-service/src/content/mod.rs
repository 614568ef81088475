//! Eulogies and download items with time-limited visibility.

pub mod expiry;
pub mod service;

pub use expiry::{ContentExpiryManager, Viewer};
pub use service::{ContentService, ContentSummary, ContentUpload};
