//! The project store trait.

use async_trait::async_trait;

use printvault_core::result::AppResult;
use printvault_core::types::{MeshId, ProjectId, ToolpathId};
use printvault_entity::mesh::{CreateMesh, MeshRecord};
use printvault_entity::project::{CreateProject, CreateProjectTree, Project, ProjectTree};
use printvault_entity::toolpath::{CreateToolpath, ToolpathRecord};

/// Transactional persistence for the project/mesh/toolpath record tree.
///
/// Multi-row operations (`create_project_tree`, `set_default_version`,
/// cascade deletes) are atomic: a concurrent reader never observes a
/// half-created branch or a lineage with zero or two defaults.
#[async_trait]
pub trait ProjectStore: Send + Sync + 'static {
    // ── Projects ─────────────────────────────────────────────────

    /// Insert a single project row.
    async fn create_project(&self, data: CreateProject) -> AppResult<Project>;

    /// Insert a project together with its nested mesh and toolpath rows
    /// as one all-or-nothing unit.
    async fn create_project_tree(&self, tree: CreateProjectTree) -> AppResult<Project>;

    /// Find a project by id.
    async fn find_project(&self, id: ProjectId) -> AppResult<Option<Project>>;

    /// Find a project with all of its mesh and toolpath children.
    async fn find_project_tree(&self, id: ProjectId) -> AppResult<Option<ProjectTree>>;

    /// All members of a lineage (the root plus its direct children),
    /// ordered by version number ascending.
    async fn find_lineage(&self, root_id: ProjectId) -> AppResult<Vec<Project>>;

    /// The representative version of every lineage: the member flagged as
    /// default, or the parentless root for lineages where no member
    /// carries the flag. Ordered by creation time, newest first.
    async fn list_default_projects(&self) -> AppResult<Vec<Project>>;

    /// Update a project row.
    async fn update_project(&self, project: &Project) -> AppResult<Project>;

    /// Atomically clear the default flag across a lineage and set it on
    /// the target member. Fails with `NotFound` if the target is not a
    /// member of the lineage.
    async fn set_default_version(&self, root_id: ProjectId, target: ProjectId) -> AppResult<()>;

    /// Delete a project, cascading to its meshes and their toolpaths.
    /// Returns `true` if a row was deleted.
    async fn delete_project(&self, id: ProjectId) -> AppResult<bool>;

    // ── Meshes ───────────────────────────────────────────────────

    /// Insert a mesh record.
    async fn create_mesh(&self, data: CreateMesh) -> AppResult<MeshRecord>;

    /// Find a mesh record by id.
    async fn find_mesh(&self, id: MeshId) -> AppResult<Option<MeshRecord>>;

    /// All mesh records of a project, ordered by id.
    async fn find_meshes_by_project(&self, project_id: ProjectId) -> AppResult<Vec<MeshRecord>>;

    /// Update a mesh record.
    async fn update_mesh(&self, mesh: &MeshRecord) -> AppResult<MeshRecord>;

    /// Delete a mesh record, cascading to its toolpaths. Returns `true`
    /// if a row was deleted.
    async fn delete_mesh(&self, id: MeshId) -> AppResult<bool>;

    /// Delete every mesh record of a project (with toolpath cascade) in
    /// one atomic unit. Returns the number of mesh rows deleted.
    async fn delete_meshes_by_project(&self, project_id: ProjectId) -> AppResult<u64>;

    // ── Toolpaths ────────────────────────────────────────────────

    /// Insert a toolpath record.
    async fn create_toolpath(&self, data: CreateToolpath) -> AppResult<ToolpathRecord>;

    /// Find a toolpath record by id.
    async fn find_toolpath(&self, id: ToolpathId) -> AppResult<Option<ToolpathRecord>>;

    /// All toolpath records of a mesh, ordered by id.
    async fn find_toolpaths_by_mesh(&self, mesh_id: MeshId) -> AppResult<Vec<ToolpathRecord>>;

    /// Delete a toolpath record. Returns `true` if a row was deleted.
    async fn delete_toolpath(&self, id: ToolpathId) -> AppResult<bool>;

    // ── Reference counting ───────────────────────────────────────

    /// Count live records (mesh plus toolpath) whose `file_path` equals
    /// the given path exactly. Used as the liveness check gating physical
    /// deletion; must be queried *after* the triggering logical delete
    /// has committed.
    async fn count_path_references(&self, path: &str) -> AppResult<u64>;
}
