//! Toolpath (slicer output) ingestion.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use printvault_core::config::StorageConfig;
use printvault_core::error::AppError;
use printvault_core::result::AppResult;
use printvault_core::traits::StorageProvider;
use printvault_core::types::{MeshId, ToolpathId};
use printvault_database::ProjectStore;
use printvault_entity::toolpath::{CreateToolpath, ToolpathRecord};
use printvault_extract::toolpath::extract_metadata;
use printvault_storage::path;

use crate::reference::FileReferenceService;

/// Service for toolpath record lifecycle and G-code ingestion.
#[derive(Clone)]
pub struct ToolpathService {
    store: Arc<dyn ProjectStore>,
    storage: Arc<dyn StorageProvider>,
    references: Arc<FileReferenceService>,
    config: StorageConfig,
}

impl std::fmt::Debug for ToolpathService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolpathService").finish()
    }
}

impl ToolpathService {
    /// Create a new toolpath service.
    pub fn new(
        store: Arc<dyn ProjectStore>,
        storage: Arc<dyn StorageProvider>,
        references: Arc<FileReferenceService>,
        config: StorageConfig,
    ) -> Self {
        Self {
            store,
            storage,
            references,
            config,
        }
    }

    /// Ingest an uploaded slicer file onto a mesh.
    ///
    /// Print metadata is read from the text best-effort; unrecognized
    /// formats yield a record with zeroed estimates, never an error.
    pub async fn upload_toolpath(
        &self,
        mesh_id: MeshId,
        file_name: &str,
        data: Bytes,
    ) -> AppResult<ToolpathRecord> {
        self.require_mesh(mesh_id).await?;

        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let metadata = {
            let text = String::from_utf8_lossy(&data);
            extract_metadata(&text)
        };

        let storage_path = path::unique_storage_name(file_name);
        self.storage.write_atomic(&storage_path, data).await?;
        debug!(path = %storage_path, "Stored uploaded slicer file");

        let toolpath = self
            .store
            .create_toolpath(CreateToolpath::new(
                mesh_id,
                file_name,
                storage_path,
                metadata.print_time_seconds,
                metadata.filament_length_mm,
            ))
            .await?;

        info!(toolpath_id = %toolpath.id, mesh_id = %mesh_id, name = %toolpath.name, "Uploaded toolpath");
        Ok(toolpath)
    }

    /// Record an absolute path to a slicer file outside the storage root.
    ///
    /// The bytes stay where they are; PrintVault never deletes them.
    pub async fn link_toolpath(
        &self,
        mesh_id: MeshId,
        source_path: &str,
    ) -> AppResult<ToolpathRecord> {
        self.require_mesh(mesh_id).await?;

        let metadata = match tokio::fs::read_to_string(source_path).await {
            Ok(text) => extract_metadata(&text),
            Err(e) => {
                warn!(path = %source_path, error = %e, "Linked slicer file unreadable, recording without metadata");
                Default::default()
            }
        };

        let toolpath = self
            .store
            .create_toolpath(CreateToolpath::new(
                mesh_id,
                path::file_name(source_path),
                source_path,
                metadata.print_time_seconds,
                metadata.filament_length_mm,
            ))
            .await?;

        info!(toolpath_id = %toolpath.id, mesh_id = %mesh_id, source = %source_path, "Linked toolpath");
        Ok(toolpath)
    }

    /// List a mesh's toolpath records.
    pub async fn list_toolpaths(&self, mesh_id: MeshId) -> AppResult<Vec<ToolpathRecord>> {
        self.store.find_toolpaths_by_mesh(mesh_id).await
    }

    /// Delete a toolpath record, then release its physical file if no
    /// remaining record references it.
    pub async fn delete_toolpath(&self, toolpath_id: ToolpathId) -> AppResult<()> {
        let toolpath = self
            .store
            .find_toolpath(toolpath_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Toolpath record {toolpath_id} not found"))
            })?;

        self.store.delete_toolpath(toolpath_id).await?;
        info!(toolpath_id = %toolpath_id, "Deleted toolpath");

        self.references.safe_delete(&toolpath.file_path).await
    }

    async fn require_mesh(&self, mesh_id: MeshId) -> AppResult<()> {
        self.store
            .find_mesh(mesh_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Mesh record {mesh_id} not found")))
    }
}
