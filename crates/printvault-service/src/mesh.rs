//! Mesh (STL) ingestion and print-progress tracking.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use printvault_core::config::StorageConfig;
use printvault_core::error::{AppError, ErrorKind};
use printvault_core::result::AppResult;
use printvault_core::traits::StorageProvider;
use printvault_core::types::{MeshId, ProjectId};
use printvault_database::ProjectStore;
use printvault_entity::mesh::{CreateMesh, MeshRecord};
use printvault_entity::toolpath::CreateToolpath;
use printvault_extract::geometry::{self, MeshGeometry};
use printvault_extract::toolpath as toolpath_extract;
use printvault_storage::path;

use crate::reference::FileReferenceService;

/// How a file outside the storage root is brought onto a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Copy the bytes into the storage root under a generated name.
    Copy,
    /// Record the absolute source path; the bytes stay where they are
    /// and are never deleted by PrintVault.
    Link,
}

/// Outcome of a folder scan.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanReport {
    /// Mesh file names imported onto the project.
    pub imported: Vec<String>,
    /// File names skipped because the project already has a mesh with
    /// that name.
    pub skipped: Vec<String>,
    /// Human-readable notes, e.g. ambiguous toolpath associations.
    pub warnings: Vec<String>,
}

/// Service for mesh record lifecycle and STL ingestion.
#[derive(Clone)]
pub struct MeshService {
    store: Arc<dyn ProjectStore>,
    storage: Arc<dyn StorageProvider>,
    references: Arc<FileReferenceService>,
    config: StorageConfig,
}

impl std::fmt::Debug for MeshService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshService").finish()
    }
}

impl MeshService {
    /// Create a new mesh service.
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

    /// Ingest an uploaded STL body onto a project.
    ///
    /// Geometry extraction runs on a blocking worker; the bytes land
    /// under the storage root via temp-write-then-rename before the
    /// record is created. Extraction never aborts ingestion: malformed
    /// bytes give a record with zeroed geometry.
    pub async fn upload_mesh(
        &self,
        project_id: ProjectId,
        file_name: &str,
        data: Bytes,
    ) -> AppResult<MeshRecord> {
        self.require_project(project_id).await?;

        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let geometry = extract_geometry_blocking(data.clone()).await?;

        let storage_path = path::unique_storage_name(file_name);
        self.storage.write_atomic(&storage_path, data).await?;
        debug!(path = %storage_path, "Stored uploaded mesh file");

        let mesh = self
            .store
            .create_mesh(with_geometry(
                CreateMesh::new(project_id, file_name, storage_path),
                geometry,
            ))
            .await?;

        info!(mesh_id = %mesh.id, project_id = %project_id, name = %mesh.name, "Uploaded mesh");
        Ok(mesh)
    }

    /// Bring an STL file from outside the storage root onto a project,
    /// either copying the bytes in or linking the absolute path.
    pub async fn add_mesh_from_path(
        &self,
        project_id: ProjectId,
        source_path: &str,
        mode: ImportMode,
    ) -> AppResult<MeshRecord> {
        self.require_project(project_id).await?;

        let name = path::file_name(source_path).to_string();
        let (file_path, data) = match mode {
            ImportMode::Copy => {
                let dest = path::unique_storage_name(&name);
                self.storage.copy_in(source_path, &dest).await?;
                let data = self.storage.read_bytes(&dest).await?;
                (dest, Some(data))
            }
            ImportMode::Link => {
                let data = match tokio::fs::read(source_path).await {
                    Ok(bytes) => Some(Bytes::from(bytes)),
                    Err(e) => {
                        warn!(path = %source_path, error = %e, "Linked mesh file unreadable, skipping extraction");
                        None
                    }
                };
                (source_path.to_string(), data)
            }
        };

        let geometry = match data {
            Some(bytes) => extract_geometry_blocking(bytes).await?,
            None => MeshGeometry::default(),
        };

        let mesh = self
            .store
            .create_mesh(with_geometry(
                CreateMesh::new(project_id, name, file_path),
                geometry,
            ))
            .await?;

        info!(mesh_id = %mesh.id, project_id = %project_id, source = %source_path, ?mode, "Imported mesh");
        Ok(mesh)
    }

    /// Scan a folder for STL files and import the ones the project does
    /// not already have, pairing each new mesh with its slicer output
    /// when exactly one `.gcode` file in the folder matches its name.
    pub async fn scan_folder(
        &self,
        project_id: ProjectId,
        folder: &str,
        mode: ImportMode,
    ) -> AppResult<ScanReport> {
        self.require_project(project_id).await?;

        let entries = list_folder_files(folder).await?;
        let stl_files: Vec<&String> = entries
            .iter()
            .filter(|n| path::has_extension(n, "stl"))
            .collect();
        let gcode_files: Vec<&String> = entries
            .iter()
            .filter(|n| path::has_extension(n, "gcode"))
            .collect();

        let existing: Vec<String> = self
            .store
            .find_meshes_by_project(project_id)
            .await?
            .into_iter()
            .map(|m| m.name.to_lowercase())
            .collect();

        let mut report = ScanReport::default();
        for stl in stl_files {
            if existing.contains(&stl.to_lowercase()) {
                report.skipped.push(stl.clone());
                continue;
            }

            let source = join_path(folder, stl);
            let mesh = self.add_mesh_from_path(project_id, &source, mode).await?;
            report.imported.push(stl.clone());

            let stem = path::file_stem(stl).to_lowercase();
            let matches: Vec<&&String> = gcode_files
                .iter()
                .filter(|g| g.to_lowercase().contains(&stem))
                .collect();
            match matches.as_slice() {
                [] => {}
                [gcode] => {
                    self.associate_toolpath(mesh.id, folder, gcode, mode)
                        .await?;
                }
                many => {
                    report.warnings.push(format!(
                        "{} slicer files match '{stl}'; none associated",
                        many.len()
                    ));
                }
            }
        }

        info!(
            project_id = %project_id,
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "Scanned folder"
        );
        Ok(report)
    }

    /// Set the desired print count. Completed count is clamped down if
    /// the new target is below it.
    pub async fn update_quantity(&self, mesh_id: MeshId, quantity: i32) -> AppResult<MeshRecord> {
        if quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }
        let mut mesh = self.require_mesh(mesh_id).await?;
        mesh.quantity = quantity;
        mesh.printed_quantity = mesh.printed_quantity.min(quantity);
        self.store.update_mesh(&mesh).await
    }

    /// Record print progress. The completed count is clamped to
    /// `0..=quantity`.
    pub async fn record_printed(&self, mesh_id: MeshId, printed: i32) -> AppResult<MeshRecord> {
        let mut mesh = self.require_mesh(mesh_id).await?;
        mesh.printed_quantity = printed.clamp(0, mesh.quantity);
        self.store.update_mesh(&mesh).await
    }

    /// Replace the free-text comment.
    pub async fn update_comment(
        &self,
        mesh_id: MeshId,
        comment: Option<String>,
    ) -> AppResult<MeshRecord> {
        let mut mesh = self.require_mesh(mesh_id).await?;
        mesh.comment = comment;
        self.store.update_mesh(&mesh).await
    }

    /// Delete a mesh record and its toolpaths, then release any physical
    /// files no remaining record references.
    pub async fn delete_mesh(&self, mesh_id: MeshId) -> AppResult<()> {
        let mesh = self.require_mesh(mesh_id).await?;

        let mut paths: Vec<String> = self
            .store
            .find_toolpaths_by_mesh(mesh_id)
            .await?
            .into_iter()
            .map(|t| t.file_path)
            .collect();
        paths.push(mesh.file_path);

        self.store.delete_mesh(mesh_id).await?;
        info!(mesh_id = %mesh_id, "Deleted mesh");

        self.references.cleanup_paths(paths).await
    }

    /// Delete every mesh record of a project (with toolpath cascade),
    /// then release unreferenced physical files.
    pub async fn delete_all_meshes(&self, project_id: ProjectId) -> AppResult<u64> {
        self.require_project(project_id).await?;

        let mut paths = Vec::new();
        for mesh in self.store.find_meshes_by_project(project_id).await? {
            for toolpath in self.store.find_toolpaths_by_mesh(mesh.id).await? {
                paths.push(toolpath.file_path);
            }
            paths.push(mesh.file_path);
        }

        let deleted = self.store.delete_meshes_by_project(project_id).await?;
        info!(project_id = %project_id, deleted, "Deleted all meshes");

        self.references.cleanup_paths(paths).await?;
        Ok(deleted)
    }

    async fn associate_toolpath(
        &self,
        mesh_id: MeshId,
        folder: &str,
        gcode_name: &str,
        mode: ImportMode,
    ) -> AppResult<()> {
        let source = join_path(folder, gcode_name);
        let metadata = match tokio::fs::read_to_string(&source).await {
            Ok(text) => toolpath_extract::extract_metadata(&text),
            Err(e) => {
                warn!(path = %source, error = %e, "Slicer file unreadable, recording without metadata");
                Default::default()
            }
        };

        let file_path = match mode {
            ImportMode::Copy => {
                let dest = path::unique_storage_name(gcode_name);
                self.storage.copy_in(&source, &dest).await?;
                dest
            }
            ImportMode::Link => source,
        };

        self.store
            .create_toolpath(CreateToolpath::new(
                mesh_id,
                gcode_name,
                file_path,
                metadata.print_time_seconds,
                metadata.filament_length_mm,
            ))
            .await?;
        debug!(mesh_id = %mesh_id, gcode = %gcode_name, "Associated slicer file");
        Ok(())
    }

    async fn require_project(&self, project_id: ProjectId) -> AppResult<()> {
        self.store
            .find_project(project_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))
    }

    async fn require_mesh(&self, mesh_id: MeshId) -> AppResult<MeshRecord> {
        self.store
            .find_mesh(mesh_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Mesh record {mesh_id} not found")))
    }
}

/// Run geometry extraction on a blocking worker thread.
async fn extract_geometry_blocking(data: Bytes) -> AppResult<MeshGeometry> {
    tokio::task::spawn_blocking(move || geometry::extract_geometry(&data))
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Geometry extraction task failed", e)
        })
}

fn with_geometry(mut create: CreateMesh, geometry: MeshGeometry) -> CreateMesh {
    create.dim_x = geometry.dim_x;
    create.dim_y = geometry.dim_y;
    create.dim_z = geometry.dim_z;
    create.volume = geometry.volume;
    create
}

fn join_path(folder: &str, name: &str) -> String {
    Path::new(folder).join(name).to_string_lossy().into_owned()
}

/// File names directly under a folder outside the storage root.
async fn list_folder_files(folder: &str) -> AppResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .map_err(|e| AppError::validation(format!("Cannot read folder '{folder}': {e}")))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::validation(format!("Cannot read folder '{folder}': {e}")))?
    {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
