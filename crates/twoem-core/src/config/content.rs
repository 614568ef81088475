//! Content expiry configuration.

use serde::{Deserialize, Serialize};

/// Lifetimes applied to newly uploaded content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Days a eulogy stays visible after upload.
    #[serde(default = "default_eulogy_ttl")]
    pub eulogy_ttl_days: i64,
    /// Days a download item stays visible after upload.
    #[serde(default = "default_download_ttl")]
    pub download_ttl_days: i64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            eulogy_ttl_days: default_eulogy_ttl(),
            download_ttl_days: default_download_ttl(),
        }
    }
}

fn default_eulogy_ttl() -> i64 {
    7
}

fn default_download_ttl() -> i64 {
    365
}
