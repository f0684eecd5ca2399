//! Storage provider trait for the managed file root.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the byte store backing the managed storage root.
///
/// Paths are always relative to the provider's root. The trait is defined
/// here in `printvault-core` and implemented in `printvault-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Read a file into memory as a complete byte vector.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to a file at the given path.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Write bytes to a temporary sibling path, then rename into place.
    ///
    /// A cancelled or failed write must never leave a partially written
    /// file at `path`; callers commit the logical record only after this
    /// returns.
    async fn write_atomic(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete a file at the given path.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a file exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Copy a file from an absolute source path outside the root to a
    /// relative destination inside it.
    async fn copy_in(&self, source: &str, dest: &str) -> AppResult<()>;

    /// List the file names directly under a directory.
    async fn list(&self, path: &str) -> AppResult<Vec<String>>;

    /// Create a directory (and any missing parents).
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}
