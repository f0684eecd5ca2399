//! In-memory [`ProjectStore`] implementation.
//!
//! Backs tests and embedded single-process use. All tables live behind
//! one async mutex, which doubles as the single-writer serialization for
//! the multi-row operations: everything that must be atomic happens under
//! one lock acquisition.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use printvault_core::error::AppError;
use printvault_core::result::AppResult;
use printvault_core::types::{MeshId, ProjectId, ToolpathId};
use printvault_entity::mesh::{CreateMesh, MeshRecord};
use printvault_entity::project::{
    CreateProject, CreateProjectTree, MeshTree, Project, ProjectTree,
};
use printvault_entity::toolpath::{CreateToolpath, ToolpathRecord};

use crate::store::ProjectStore;

/// The three record tables plus id counters.
#[derive(Debug, Default)]
struct Tables {
    projects: BTreeMap<i64, Project>,
    meshes: BTreeMap<i64, MeshRecord>,
    toolpaths: BTreeMap<i64, ToolpathRecord>,
    next_project_id: i64,
    next_mesh_id: i64,
    next_toolpath_id: i64,
}

impl Tables {
    fn insert_project(&mut self, data: CreateProject) -> Project {
        self.next_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: ProjectId::from_i64(self.next_project_id),
            name: data.name,
            description: data.description,
            status: data.status,
            theme: data.theme,
            category: data.category,
            local_folder_path: data.local_folder_path,
            version_name: data.version_name,
            version_number: data.version_number,
            is_default: data.is_default,
            parent_project_id: data.parent_project_id,
            filament_id: data.filament_id,
            printer_id: data.printer_id,
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(project.id.into_i64(), project.clone());
        project
    }

    fn insert_mesh(&mut self, data: CreateMesh) -> MeshRecord {
        self.next_mesh_id += 1;
        let now = Utc::now();
        let mesh = MeshRecord {
            id: MeshId::from_i64(self.next_mesh_id),
            project_id: data.project_id,
            name: data.name,
            file_path: data.file_path,
            quantity: data.quantity,
            printed_quantity: data.printed_quantity,
            dim_x: data.dim_x,
            dim_y: data.dim_y,
            dim_z: data.dim_z,
            volume: data.volume,
            comment: data.comment,
            created_at: now,
            updated_at: now,
        };
        self.meshes.insert(mesh.id.into_i64(), mesh.clone());
        mesh
    }

    fn insert_toolpath(&mut self, data: CreateToolpath) -> ToolpathRecord {
        self.next_toolpath_id += 1;
        let toolpath = ToolpathRecord {
            id: ToolpathId::from_i64(self.next_toolpath_id),
            mesh_id: data.mesh_id,
            name: data.name,
            file_path: data.file_path,
            print_time_seconds: data.print_time_seconds,
            filament_length_mm: data.filament_length_mm,
            nozzle_temp: data.nozzle_temp,
            bed_temp: data.bed_temp,
            cost_electricity: data.cost_electricity,
            cost_machine: data.cost_machine,
            cost_filament: data.cost_filament,
            filament_id: data.filament_id,
            created_at: Utc::now(),
        };
        self.toolpaths.insert(toolpath.id.into_i64(), toolpath.clone());
        toolpath
    }

    fn lineage_member_ids(&self, root_id: ProjectId) -> Vec<i64> {
        self.projects
            .values()
            .filter(|p| p.id == root_id || p.parent_project_id == Some(root_id))
            .map(|p| p.id.into_i64())
            .collect()
    }

    /// Remove a project and its full record subtree, returning whether
    /// the project row existed.
    fn remove_project_cascade(&mut self, id: ProjectId) -> bool {
        if self.projects.remove(&id.into_i64()).is_none() {
            return false;
        }
        // Children point at the root, so deleting a root takes the whole
        // lineage with it (mirrors the FK cascade in the Postgres schema).
        let child_ids: Vec<ProjectId> = self
            .projects
            .values()
            .filter(|p| p.parent_project_id == Some(id))
            .map(|p| p.id)
            .collect();
        for child in child_ids {
            self.remove_project_cascade(child);
        }
        let mesh_ids: Vec<i64> = self
            .meshes
            .values()
            .filter(|m| m.project_id == id)
            .map(|m| m.id.into_i64())
            .collect();
        for mesh_id in mesh_ids {
            self.meshes.remove(&mesh_id);
            self.toolpaths
                .retain(|_, t| t.mesh_id.into_i64() != mesh_id);
        }
        true
    }
}

/// In-memory project store.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    tables: Mutex<Tables>,
}

impl MemoryProjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create_project(&self, data: CreateProject) -> AppResult<Project> {
        let mut tables = self.tables.lock().await;
        Ok(tables.insert_project(data))
    }

    async fn create_project_tree(&self, tree: CreateProjectTree) -> AppResult<Project> {
        // One lock acquisition makes the whole nested insert atomic.
        let mut tables = self.tables.lock().await;
        let project = tables.insert_project(tree.project);

        for mesh_tree in tree.meshes {
            let mesh = tables.insert_mesh(CreateMesh {
                project_id: project.id,
                name: mesh_tree.name,
                file_path: mesh_tree.file_path,
                quantity: mesh_tree.quantity,
                printed_quantity: mesh_tree.printed_quantity,
                dim_x: mesh_tree.dim_x,
                dim_y: mesh_tree.dim_y,
                dim_z: mesh_tree.dim_z,
                volume: mesh_tree.volume,
                comment: mesh_tree.comment,
            });
            for toolpath in mesh_tree.toolpaths {
                tables.insert_toolpath(CreateToolpath {
                    mesh_id: mesh.id,
                    name: toolpath.name,
                    file_path: toolpath.file_path,
                    print_time_seconds: toolpath.print_time_seconds,
                    filament_length_mm: toolpath.filament_length_mm,
                    nozzle_temp: toolpath.nozzle_temp,
                    bed_temp: toolpath.bed_temp,
                    cost_electricity: toolpath.cost_electricity,
                    cost_machine: toolpath.cost_machine,
                    cost_filament: toolpath.cost_filament,
                    filament_id: toolpath.filament_id,
                });
            }
        }
        Ok(project)
    }

    async fn find_project(&self, id: ProjectId) -> AppResult<Option<Project>> {
        let tables = self.tables.lock().await;
        Ok(tables.projects.get(&id.into_i64()).cloned())
    }

    async fn find_project_tree(&self, id: ProjectId) -> AppResult<Option<ProjectTree>> {
        let tables = self.tables.lock().await;
        let Some(project) = tables.projects.get(&id.into_i64()).cloned() else {
            return Ok(None);
        };

        let meshes = tables
            .meshes
            .values()
            .filter(|m| m.project_id == id)
            .map(|mesh| MeshTree {
                mesh: mesh.clone(),
                toolpaths: tables
                    .toolpaths
                    .values()
                    .filter(|t| t.mesh_id == mesh.id)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(Some(ProjectTree { project, meshes }))
    }

    async fn find_lineage(&self, root_id: ProjectId) -> AppResult<Vec<Project>> {
        let tables = self.tables.lock().await;
        let mut members: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.id == root_id || p.parent_project_id == Some(root_id))
            .cloned()
            .collect();
        members.sort_by_key(|p| p.version_number);
        Ok(members)
    }

    async fn list_default_projects(&self) -> AppResult<Vec<Project>> {
        let tables = self.tables.lock().await;
        let mut result: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| {
                if p.is_default {
                    return true;
                }
                // Parentless root of a lineage where nobody carries the flag.
                p.parent_project_id.is_none()
                    && !tables
                        .projects
                        .values()
                        .any(|c| (c.id == p.id || c.parent_project_id == Some(p.id)) && c.is_default)
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update_project(&self, project: &Project) -> AppResult<Project> {
        let mut tables = self.tables.lock().await;
        let key = project.id.into_i64();
        if !tables.projects.contains_key(&key) {
            return Err(AppError::not_found(format!(
                "Project {} not found",
                project.id
            )));
        }
        let mut updated = project.clone();
        updated.updated_at = Utc::now();
        tables.projects.insert(key, updated.clone());
        Ok(updated)
    }

    async fn set_default_version(&self, root_id: ProjectId, target: ProjectId) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let members = tables.lineage_member_ids(root_id);
        if !members.contains(&target.into_i64()) {
            return Err(AppError::not_found(format!(
                "Project {target} is not a member of lineage {root_id}"
            )));
        }
        // Clear-then-set under one lock: readers never observe zero or
        // two defaults.
        for member in members {
            if let Some(p) = tables.projects.get_mut(&member) {
                p.is_default = member == target.into_i64();
                p.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables.remove_project_cascade(id))
    }

    async fn create_mesh(&self, data: CreateMesh) -> AppResult<MeshRecord> {
        let mut tables = self.tables.lock().await;
        if !tables.projects.contains_key(&data.project_id.into_i64()) {
            return Err(AppError::not_found(format!(
                "Project {} not found",
                data.project_id
            )));
        }
        Ok(tables.insert_mesh(data))
    }

    async fn find_mesh(&self, id: MeshId) -> AppResult<Option<MeshRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.meshes.get(&id.into_i64()).cloned())
    }

    async fn find_meshes_by_project(&self, project_id: ProjectId) -> AppResult<Vec<MeshRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .meshes
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update_mesh(&self, mesh: &MeshRecord) -> AppResult<MeshRecord> {
        let mut tables = self.tables.lock().await;
        let key = mesh.id.into_i64();
        if !tables.meshes.contains_key(&key) {
            return Err(AppError::not_found(format!("Mesh {} not found", mesh.id)));
        }
        let mut updated = mesh.clone();
        updated.updated_at = Utc::now();
        tables.meshes.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete_mesh(&self, id: MeshId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.meshes.remove(&id.into_i64()).is_none() {
            return Ok(false);
        }
        tables.toolpaths.retain(|_, t| t.mesh_id != id);
        Ok(true)
    }

    async fn delete_meshes_by_project(&self, project_id: ProjectId) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let mesh_ids: Vec<MeshId> = tables
            .meshes
            .values()
            .filter(|m| m.project_id == project_id)
            .map(|m| m.id)
            .collect();
        for id in &mesh_ids {
            tables.meshes.remove(&id.into_i64());
            tables.toolpaths.retain(|_, t| t.mesh_id != *id);
        }
        Ok(mesh_ids.len() as u64)
    }

    async fn create_toolpath(&self, data: CreateToolpath) -> AppResult<ToolpathRecord> {
        let mut tables = self.tables.lock().await;
        if !tables.meshes.contains_key(&data.mesh_id.into_i64()) {
            return Err(AppError::not_found(format!(
                "Mesh {} not found",
                data.mesh_id
            )));
        }
        Ok(tables.insert_toolpath(data))
    }

    async fn find_toolpath(&self, id: ToolpathId) -> AppResult<Option<ToolpathRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.toolpaths.get(&id.into_i64()).cloned())
    }

    async fn find_toolpaths_by_mesh(&self, mesh_id: MeshId) -> AppResult<Vec<ToolpathRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .toolpaths
            .values()
            .filter(|t| t.mesh_id == mesh_id)
            .cloned()
            .collect())
    }

    async fn delete_toolpath(&self, id: ToolpathId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables.toolpaths.remove(&id.into_i64()).is_some())
    }

    async fn count_path_references(&self, path: &str) -> AppResult<u64> {
        let tables = self.tables.lock().await;
        let mesh_count = tables
            .meshes
            .values()
            .filter(|m| m.file_path == path)
            .count();
        let toolpath_count = tables
            .toolpaths
            .values()
            .filter(|t| t.file_path == path)
            .count();
        Ok((mesh_count + toolpath_count) as u64)
    }
}
