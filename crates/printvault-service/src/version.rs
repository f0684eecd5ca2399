//! Project version graph operations.
//!
//! A lineage is a root project plus the derived versions created from it.
//! The tree is flat: every derived version points at the root, whichever
//! member it was branched from. Exactly one member of a populated lineage
//! carries the default flag.

use std::sync::Arc;

use tracing::info;

use printvault_core::config::{RootDeletePolicy, VersioningConfig};
use printvault_core::error::AppError;
use printvault_core::result::AppResult;
use printvault_core::types::ProjectId;
use printvault_database::ProjectStore;
use printvault_entity::project::{
    CreateMeshTree, CreateProject, CreateProjectTree, CreateToolpathTree, Project, ProjectTree,
    VersionInfo,
};

use crate::reference::FileReferenceService;

/// Fields for creating a new lineage root.
#[derive(Debug, Clone, Default)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Free-text theme tag.
    pub theme: Option<String>,
    /// Optional category label.
    pub category: Option<String>,
    /// Optional external folder used as a scan root.
    pub local_folder_path: Option<String>,
    /// Default filament choice.
    pub filament_id: Option<i64>,
    /// Default printer choice.
    pub printer_id: Option<i64>,
}

/// Service for lineage management: create, branch, default selection,
/// deletion.
#[derive(Clone)]
pub struct VersionService {
    store: Arc<dyn ProjectStore>,
    references: Arc<FileReferenceService>,
    config: VersioningConfig,
}

impl std::fmt::Debug for VersionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionService").finish()
    }
}

impl VersionService {
    /// Create a new version service.
    pub fn new(
        store: Arc<dyn ProjectStore>,
        references: Arc<FileReferenceService>,
        config: VersioningConfig,
    ) -> Self {
        Self {
            store,
            references,
            config,
        }
    }

    /// Create a new lineage root.
    ///
    /// The root starts as its lineage's default version.
    pub async fn create_project(&self, req: CreateProjectRequest) -> AppResult<Project> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Project name cannot be empty"));
        }

        let project = self
            .store
            .create_project(CreateProject {
                name: req.name,
                description: req.description,
                status: "active".to_string(),
                theme: req.theme,
                category: req.category,
                local_folder_path: req.local_folder_path,
                version_name: self.config.initial_version_name.clone(),
                version_number: 1,
                is_default: true,
                parent_project_id: None,
                filament_id: req.filament_id,
                printer_id: req.printer_id,
            })
            .await?;

        info!(project_id = %project.id, name = %project.name, "Created project");
        Ok(project)
    }

    /// Derive a new version from an existing one.
    ///
    /// The new version joins the source's lineage as a child of the root
    /// with `version_number = max + 1`, copies the source's descriptive
    /// fields and its whole record tree (same `file_path` strings, new
    /// ids, print progress reset), and is never the default. The source
    /// is not mutated. The whole insert is one atomic unit.
    pub async fn branch(
        &self,
        source_id: ProjectId,
        version_label: &str,
    ) -> AppResult<Project> {
        let source = self
            .store
            .find_project_tree(source_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {source_id} not found")))?;

        let root_id = source.project.root_id();
        let next_number = self
            .store
            .find_lineage(root_id)
            .await?
            .iter()
            .map(|p| p.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let label = version_label.trim();
        let version_name = if label.is_empty() {
            format!("v{next_number}")
        } else {
            label.to_string()
        };

        let tree = branch_tree(&source, root_id, version_name, next_number);
        let branch = self.store.create_project_tree(tree).await?;

        info!(
            project_id = %branch.id,
            source_id = %source_id,
            root_id = %root_id,
            version_number = branch.version_number,
            "Branched project version"
        );
        Ok(branch)
    }

    /// List every version of the given project's lineage, ordered by
    /// version number.
    pub async fn list_lineage(&self, project_id: ProjectId) -> AppResult<Vec<VersionInfo>> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))?;

        let lineage = self.store.find_lineage(project.root_id()).await?;
        Ok(lineage
            .into_iter()
            .map(|p| VersionInfo {
                id: p.id,
                version_name: p.version_name,
                version_number: p.version_number,
                is_default: p.is_default,
            })
            .collect())
    }

    /// Make the given version its lineage's default.
    ///
    /// Clears the flag across the lineage and sets it on the target as
    /// one atomic unit, so exactly one member holds it at any instant.
    pub async fn set_default(&self, project_id: ProjectId) -> AppResult<()> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))?;

        self.store
            .set_default_version(project.root_id(), project_id)
            .await?;

        info!(project_id = %project_id, "Set default version");
        Ok(())
    }

    /// Delete a project version and its record tree, then release any
    /// physical files no remaining record references.
    ///
    /// Deleting a root applies the configured policy: cascade takes the
    /// whole lineage, refuse errors while derived versions remain.
    pub async fn delete_project(&self, project_id: ProjectId) -> AppResult<()> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))?;

        let member_ids: Vec<ProjectId> = if project.is_root() {
            let lineage = self.store.find_lineage(project_id).await?;
            if lineage.len() > 1 && self.config.root_delete_policy == RootDeletePolicy::Refuse {
                return Err(AppError::conflict(format!(
                    "Project {project_id} has derived versions; delete them first"
                )));
            }
            lineage.iter().map(|p| p.id).collect()
        } else {
            vec![project_id]
        };

        // Collect candidate paths before the rows disappear; the liveness
        // check itself runs against post-delete state.
        let mut paths = Vec::new();
        for id in &member_ids {
            if let Some(tree) = self.store.find_project_tree(*id).await? {
                paths.extend(tree.all_file_paths());
            }
        }

        self.store.delete_project(project_id).await?;
        info!(
            project_id = %project_id,
            versions = member_ids.len(),
            "Deleted project"
        );

        self.references.cleanup_paths(paths).await
    }

    /// The representative version of every lineage, for listings.
    pub async fn list_default_versions(&self) -> AppResult<Vec<Project>> {
        self.store.list_default_projects().await
    }

    /// Update a version's description.
    pub async fn update_description(
        &self,
        project_id: ProjectId,
        description: Option<String>,
    ) -> AppResult<Project> {
        self.update_with(project_id, |p| p.description = description)
            .await
    }

    /// Update a version's external scan folder.
    pub async fn update_local_folder(
        &self,
        project_id: ProjectId,
        folder: Option<String>,
    ) -> AppResult<Project> {
        self.update_with(project_id, |p| p.local_folder_path = folder)
            .await
    }

    /// Update a version's default filament choice.
    pub async fn update_filament(
        &self,
        project_id: ProjectId,
        filament_id: Option<i64>,
    ) -> AppResult<Project> {
        self.update_with(project_id, |p| p.filament_id = filament_id)
            .await
    }

    /// Update a version's default printer choice.
    pub async fn update_printer(
        &self,
        project_id: ProjectId,
        printer_id: Option<i64>,
    ) -> AppResult<Project> {
        self.update_with(project_id, |p| p.printer_id = printer_id)
            .await
    }

    async fn update_with(
        &self,
        project_id: ProjectId,
        apply: impl FnOnce(&mut Project),
    ) -> AppResult<Project> {
        let mut project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))?;
        apply(&mut project);
        self.store.update_project(&project).await
    }
}

/// Build the all-or-nothing insert payload for a branch of `source`.
///
/// Descriptive fields come from the direct source version. Mesh records
/// copy their `file_path` strings (never the bytes) with print progress
/// reset; toolpath records copy path and scalar metadata verbatim.
fn branch_tree(
    source: &ProjectTree,
    root_id: ProjectId,
    version_name: String,
    version_number: i32,
) -> CreateProjectTree {
    CreateProjectTree {
        project: CreateProject {
            name: source.project.name.clone(),
            description: source.project.description.clone(),
            status: source.project.status.clone(),
            theme: source.project.theme.clone(),
            category: source.project.category.clone(),
            local_folder_path: source.project.local_folder_path.clone(),
            version_name,
            version_number,
            is_default: false,
            parent_project_id: Some(root_id),
            filament_id: source.project.filament_id,
            printer_id: source.project.printer_id,
        },
        meshes: source
            .meshes
            .iter()
            .map(|m| CreateMeshTree {
                name: m.mesh.name.clone(),
                file_path: m.mesh.file_path.clone(),
                quantity: m.mesh.quantity,
                printed_quantity: 0,
                dim_x: m.mesh.dim_x,
                dim_y: m.mesh.dim_y,
                dim_z: m.mesh.dim_z,
                volume: m.mesh.volume,
                comment: m.mesh.comment.clone(),
                toolpaths: m
                    .toolpaths
                    .iter()
                    .map(|t| CreateToolpathTree {
                        name: t.name.clone(),
                        file_path: t.file_path.clone(),
                        print_time_seconds: t.print_time_seconds,
                        filament_length_mm: t.filament_length_mm,
                        nozzle_temp: t.nozzle_temp,
                        bed_temp: t.bed_temp,
                        cost_electricity: t.cost_electricity,
                        cost_machine: t.cost_machine,
                        cost_filament: t.cost_filament,
                        filament_id: t.filament_id,
                    })
                    .collect(),
            })
            .collect(),
    }
}
