//! PostgreSQL implementation of the project store.
//!
//! Multi-row operations run inside a transaction; single-row cascades
//! lean on the `ON DELETE CASCADE` foreign keys from the schema.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use printvault_core::error::{AppError, ErrorKind};
use printvault_core::result::AppResult;
use printvault_core::types::{MeshId, ProjectId, ToolpathId};
use printvault_entity::mesh::{CreateMesh, MeshRecord};
use printvault_entity::project::{CreateProject, CreateProjectTree, MeshTree, Project, ProjectTree};
use printvault_entity::toolpath::{CreateToolpath, ToolpathRecord};

use crate::store::ProjectStore;

const INSERT_PROJECT: &str = "INSERT INTO projects \
     (name, description, status, theme, category, local_folder_path, \
      version_name, version_number, is_default, parent_project_id, \
      filament_id, printer_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
     RETURNING *";

const INSERT_MESH: &str = "INSERT INTO meshes \
     (project_id, name, file_path, quantity, printed_quantity, \
      dim_x, dim_y, dim_z, volume, comment) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
     RETURNING *";

const INSERT_TOOLPATH: &str = "INSERT INTO toolpaths \
     (mesh_id, name, file_path, print_time_seconds, filament_length_mm, \
      nozzle_temp, bed_temp, cost_electricity, cost_machine, cost_filament, \
      filament_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
     RETURNING *";

/// Project store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn create_project(&self, data: CreateProject) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(INSERT_PROJECT)
            .bind(&data.name)
            .bind(&data.description)
            .bind(&data.status)
            .bind(&data.theme)
            .bind(&data.category)
            .bind(&data.local_folder_path)
            .bind(&data.version_name)
            .bind(data.version_number)
            .bind(data.is_default)
            .bind(data.parent_project_id)
            .bind(data.filament_id)
            .bind(data.printer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to create project"))
    }

    async fn create_project_tree(&self, tree: CreateProjectTree) -> AppResult<Project> {
        let mut tx = self.begin().await?;

        let project = sqlx::query_as::<_, Project>(INSERT_PROJECT)
            .bind(&tree.project.name)
            .bind(&tree.project.description)
            .bind(&tree.project.status)
            .bind(&tree.project.theme)
            .bind(&tree.project.category)
            .bind(&tree.project.local_folder_path)
            .bind(&tree.project.version_name)
            .bind(tree.project.version_number)
            .bind(tree.project.is_default)
            .bind(tree.project.parent_project_id)
            .bind(tree.project.filament_id)
            .bind(tree.project.printer_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err("Failed to create project"))?;

        for mesh in &tree.meshes {
            let inserted = sqlx::query_as::<_, MeshRecord>(INSERT_MESH)
                .bind(project.id)
                .bind(&mesh.name)
                .bind(&mesh.file_path)
                .bind(mesh.quantity)
                .bind(mesh.printed_quantity)
                .bind(mesh.dim_x)
                .bind(mesh.dim_y)
                .bind(mesh.dim_z)
                .bind(mesh.volume)
                .bind(&mesh.comment)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err("Failed to create mesh record"))?;

            for toolpath in &mesh.toolpaths {
                sqlx::query(INSERT_TOOLPATH)
                    .bind(inserted.id)
                    .bind(&toolpath.name)
                    .bind(&toolpath.file_path)
                    .bind(toolpath.print_time_seconds)
                    .bind(toolpath.filament_length_mm)
                    .bind(toolpath.nozzle_temp)
                    .bind(toolpath.bed_temp)
                    .bind(toolpath.cost_electricity)
                    .bind(toolpath.cost_machine)
                    .bind(toolpath.cost_filament)
                    .bind(toolpath.filament_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err("Failed to create toolpath record"))?;
            }
        }

        Self::commit(tx).await?;
        Ok(project)
    }

    async fn find_project(&self, id: ProjectId) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find project"))
    }

    async fn find_project_tree(&self, id: ProjectId) -> AppResult<Option<ProjectTree>> {
        let Some(project) = self.find_project(id).await? else {
            return Ok(None);
        };

        let meshes = self.find_meshes_by_project(id).await?;
        let mut trees = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            let toolpaths = self.find_toolpaths_by_mesh(mesh.id).await?;
            trees.push(MeshTree { mesh, toolpaths });
        }

        Ok(Some(ProjectTree {
            project,
            meshes: trees,
        }))
    }

    async fn find_lineage(&self, root_id: ProjectId) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects \
             WHERE id = $1 OR parent_project_id = $1 \
             ORDER BY version_number ASC, id ASC",
        )
        .bind(root_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list lineage"))
    }

    async fn list_default_projects(&self) -> AppResult<Vec<Project>> {
        // One representative per lineage: the default-flagged member, or
        // the root itself when no member carries the flag.
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects p \
             WHERE p.is_default \
                OR (p.parent_project_id IS NULL AND NOT EXISTS ( \
                      SELECT 1 FROM projects m \
                      WHERE m.is_default \
                        AND (m.id = p.id OR m.parent_project_id = p.id))) \
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list default projects"))
    }

    async fn update_project(&self, project: &Project) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $2, description = $3, status = $4, \
             theme = $5, category = $6, local_folder_path = $7, \
             version_name = $8, version_number = $9, is_default = $10, \
             filament_id = $11, printer_id = $12, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.status)
        .bind(&project.theme)
        .bind(&project.category)
        .bind(&project.local_folder_path)
        .bind(&project.version_name)
        .bind(project.version_number)
        .bind(project.is_default)
        .bind(project.filament_id)
        .bind(project.printer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update project"))?
        .ok_or_else(|| AppError::not_found(format!("Project {} not found", project.id)))
    }

    async fn set_default_version(&self, root_id: ProjectId, target: ProjectId) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let member: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM projects \
             WHERE id = $2 AND (id = $1 OR parent_project_id = $1) \
             FOR UPDATE",
        )
        .bind(root_id)
        .bind(target)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("Failed to check lineage membership"))?;

        if member.is_none() {
            return Err(AppError::not_found(format!(
                "Project {target} is not a member of lineage {root_id}"
            )));
        }

        sqlx::query(
            "UPDATE projects SET is_default = FALSE, updated_at = NOW() \
             WHERE (id = $1 OR parent_project_id = $1) AND is_default",
        )
        .bind(root_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to clear default flags"))?;

        sqlx::query("UPDATE projects SET is_default = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to set default flag"))?;

        Self::commit(tx).await
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete project"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_mesh(&self, data: CreateMesh) -> AppResult<MeshRecord> {
        sqlx::query_as::<_, MeshRecord>(INSERT_MESH)
            .bind(data.project_id)
            .bind(&data.name)
            .bind(&data.file_path)
            .bind(data.quantity)
            .bind(data.printed_quantity)
            .bind(data.dim_x)
            .bind(data.dim_y)
            .bind(data.dim_z)
            .bind(data.volume)
            .bind(&data.comment)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to create mesh record"))
    }

    async fn find_mesh(&self, id: MeshId) -> AppResult<Option<MeshRecord>> {
        sqlx::query_as::<_, MeshRecord>("SELECT * FROM meshes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find mesh record"))
    }

    async fn find_meshes_by_project(&self, project_id: ProjectId) -> AppResult<Vec<MeshRecord>> {
        sqlx::query_as::<_, MeshRecord>(
            "SELECT * FROM meshes WHERE project_id = $1 ORDER BY id ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list mesh records"))
    }

    async fn update_mesh(&self, mesh: &MeshRecord) -> AppResult<MeshRecord> {
        sqlx::query_as::<_, MeshRecord>(
            "UPDATE meshes SET name = $2, file_path = $3, quantity = $4, \
             printed_quantity = $5, dim_x = $6, dim_y = $7, dim_z = $8, \
             volume = $9, comment = $10, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(mesh.id)
        .bind(&mesh.name)
        .bind(&mesh.file_path)
        .bind(mesh.quantity)
        .bind(mesh.printed_quantity)
        .bind(mesh.dim_x)
        .bind(mesh.dim_y)
        .bind(mesh.dim_z)
        .bind(mesh.volume)
        .bind(&mesh.comment)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update mesh record"))?
        .ok_or_else(|| AppError::not_found(format!("Mesh record {} not found", mesh.id)))
    }

    async fn delete_mesh(&self, id: MeshId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meshes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete mesh record"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_meshes_by_project(&self, project_id: ProjectId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM meshes WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete mesh records"))?;
        Ok(result.rows_affected())
    }

    async fn create_toolpath(&self, data: CreateToolpath) -> AppResult<ToolpathRecord> {
        sqlx::query_as::<_, ToolpathRecord>(INSERT_TOOLPATH)
            .bind(data.mesh_id)
            .bind(&data.name)
            .bind(&data.file_path)
            .bind(data.print_time_seconds)
            .bind(data.filament_length_mm)
            .bind(data.nozzle_temp)
            .bind(data.bed_temp)
            .bind(data.cost_electricity)
            .bind(data.cost_machine)
            .bind(data.cost_filament)
            .bind(data.filament_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to create toolpath record"))
    }

    async fn find_toolpath(&self, id: ToolpathId) -> AppResult<Option<ToolpathRecord>> {
        sqlx::query_as::<_, ToolpathRecord>("SELECT * FROM toolpaths WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find toolpath record"))
    }

    async fn find_toolpaths_by_mesh(&self, mesh_id: MeshId) -> AppResult<Vec<ToolpathRecord>> {
        sqlx::query_as::<_, ToolpathRecord>(
            "SELECT * FROM toolpaths WHERE mesh_id = $1 ORDER BY id ASC",
        )
        .bind(mesh_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list toolpath records"))
    }

    async fn delete_toolpath(&self, id: ToolpathId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM toolpaths WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete toolpath record"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_path_references(&self, path: &str) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM meshes WHERE file_path = $1) \
                  + (SELECT COUNT(*) FROM toolpaths WHERE file_path = $1)",
        )
        .bind(path)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count path references"))?;
        Ok(count as u64)
    }
}
