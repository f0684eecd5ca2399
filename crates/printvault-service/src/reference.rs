//! Reference-counted physical file deletion.
//!
//! Record `file_path`s are non-owning references: branching copies the
//! path string, so one physical file may back many records across
//! versions. Physical deletion is therefore gated on a liveness count,
//! queried *after* the triggering logical delete has committed.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use printvault_core::error::ErrorKind;
use printvault_core::result::AppResult;
use printvault_core::traits::StorageProvider;
use printvault_database::ProjectStore;
use printvault_storage::path;

/// Gate deciding whether a record deletion may remove the backing file.
#[derive(Clone)]
pub struct FileReferenceService {
    store: Arc<dyn ProjectStore>,
    storage: Arc<dyn StorageProvider>,
}

impl std::fmt::Debug for FileReferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReferenceService").finish()
    }
}

impl FileReferenceService {
    /// Create a new reference service.
    pub fn new(store: Arc<dyn ProjectStore>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { store, storage }
    }

    /// Delete the physical file behind `path` if, and only if, no live
    /// record still references it.
    ///
    /// Must be called after the logical delete that dropped the last
    /// (candidate) reference has committed, so the count reflects the
    /// post-delete state. External paths are never touched. Physical
    /// deletion is best-effort: the record is already gone, so a file
    /// that is missing, locked, or otherwise undeletable is logged and
    /// left behind rather than surfaced as an error.
    pub async fn safe_delete(&self, file_path: &str) -> AppResult<()> {
        if path::is_external(file_path) {
            debug!(path = %file_path, "Skipping external path");
            return Ok(());
        }

        let live = self.store.count_path_references(file_path).await?;
        if live > 0 {
            debug!(path = %file_path, live, "File still referenced, keeping");
            return Ok(());
        }

        match self.storage.delete(file_path).await {
            Ok(()) => {
                info!(path = %file_path, "Deleted unreferenced storage file");
            }
            Err(e) if e.kind == ErrorKind::NotFound => {
                warn!(path = %file_path, "Storage file already missing during cleanup");
            }
            Err(e) => {
                warn!(path = %file_path, error = %e, "Failed to delete storage file during cleanup");
            }
        }
        Ok(())
    }

    /// Run [`safe_delete`](Self::safe_delete) once per distinct path.
    ///
    /// Used by bulk deletes (project, mesh-with-toolpaths) after the
    /// cascade committed.
    pub async fn cleanup_paths<I>(&self, paths: I) -> AppResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        for path in paths {
            if seen.insert(path.clone()) {
                self.safe_delete(&path).await?;
            }
        }
        Ok(())
    }
}
