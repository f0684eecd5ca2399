//! Fully loaded project record trees.
//!
//! A `ProjectTree` is the find-by-id-with-children query result: one
//! project, its mesh records, and each mesh's toolpath records. The
//! `Create*Tree` structs are the write-side mirror used for the
//! all-or-nothing branch insert.

use serde::{Deserialize, Serialize};

use crate::mesh::MeshRecord;
use crate::project::model::{CreateProject, Project};
use crate::toolpath::ToolpathRecord;

/// A mesh record together with its owned toolpath records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshTree {
    /// The mesh record.
    pub mesh: MeshRecord,
    /// Toolpath records owned by this mesh.
    pub toolpaths: Vec<ToolpathRecord>,
}

/// A project together with its full record tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTree {
    /// The project row.
    pub project: Project,
    /// Mesh records owned by this project.
    pub meshes: Vec<MeshTree>,
}

impl ProjectTree {
    /// Every `file_path` referenced anywhere in this tree, deduplicated,
    /// in mesh order with each mesh's toolpath paths first (matching the
    /// cleanup order used on deletion).
    pub fn all_file_paths(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut paths = Vec::new();
        for mesh in &self.meshes {
            for toolpath in &mesh.toolpaths {
                if seen.insert(toolpath.file_path.clone()) {
                    paths.push(toolpath.file_path.clone());
                }
            }
            if seen.insert(mesh.mesh.file_path.clone()) {
                paths.push(mesh.mesh.file_path.clone());
            }
        }
        paths
    }
}

/// Toolpath scalar fields for a nested tree insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateToolpathTree {
    /// Logical name.
    pub name: String,
    /// Referenced file path (copied, never the bytes).
    pub file_path: String,
    /// Estimated print duration in seconds.
    pub print_time_seconds: i32,
    /// Estimated filament length in millimeters.
    pub filament_length_mm: f64,
    /// Nozzle temperature in °C, if recorded.
    pub nozzle_temp: Option<i32>,
    /// Bed temperature in °C, if recorded.
    pub bed_temp: Option<i32>,
    /// Per-unit electricity cost, if recorded.
    pub cost_electricity: Option<f64>,
    /// Per-unit machine cost, if recorded.
    pub cost_machine: Option<f64>,
    /// Per-unit filament cost, if recorded.
    pub cost_filament: Option<f64>,
    /// Filament choice, if recorded.
    pub filament_id: Option<i64>,
}

/// Mesh fields plus nested toolpaths for a nested tree insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeshTree {
    /// Logical name.
    pub name: String,
    /// Referenced file path (copied, never the bytes).
    pub file_path: String,
    /// Desired print count.
    pub quantity: i32,
    /// Completed print count.
    pub printed_quantity: i32,
    /// Bounding box X dimension in mm.
    pub dim_x: f64,
    /// Bounding box Y dimension in mm.
    pub dim_y: f64,
    /// Bounding box Z dimension in mm.
    pub dim_z: f64,
    /// Enclosed volume in mm³.
    pub volume: f64,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Nested toolpath inserts.
    pub toolpaths: Vec<CreateToolpathTree>,
}

/// A whole new version: project fields plus its nested record tree.
///
/// Stores insert this as one transaction — a partial failure must not
/// leave an orphaned half-branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectTree {
    /// Project fields for the new version.
    pub project: CreateProject,
    /// Nested mesh inserts.
    pub meshes: Vec<CreateMeshTree>,
}
