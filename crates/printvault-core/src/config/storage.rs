//! Storage root configuration.

use serde::{Deserialize, Serialize};

/// File storage configuration.
///
/// All managed files live under `root_path`; records reference them by
/// relative path. Absolute paths in records are links to files outside
/// the root and are never deleted by PrintVault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for managed file storage.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 500 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_max_upload() -> u64 {
    524_288_000 // 500 MB
}
