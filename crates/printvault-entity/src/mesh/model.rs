//! Mesh record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use printvault_core::types::{MeshId, ProjectId};

use crate::mesh::status::MeshStatus;

/// A logical mesh (STL) record owned by a project version.
///
/// `file_path` is a non-owning reference: branching a version copies the
/// path string, not the bytes, so several records across versions may
/// alias one physical file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MeshRecord {
    /// Unique mesh identifier.
    pub id: MeshId,
    /// The owning project version.
    pub project_id: ProjectId,
    /// Logical name (usually the original file name).
    pub name: String,
    /// Relative path under the storage root, or an absolute external path.
    pub file_path: String,
    /// Desired print count (≥ 1).
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
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl MeshRecord {
    /// Derived print status of this mesh.
    pub fn status(&self) -> MeshStatus {
        MeshStatus::derive(self.quantity, self.printed_quantity)
    }
}

/// Data required to create a new mesh record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMesh {
    /// The owning project version.
    pub project_id: ProjectId,
    /// Logical name.
    pub name: String,
    /// Relative internal path or absolute external path.
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
}

impl CreateMesh {
    /// A fresh, unprinted mesh record with zeroed geometry.
    pub fn new(project_id: ProjectId, name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            file_path: file_path.into(),
            quantity: 1,
            printed_quantity: 0,
            dim_x: 0.0,
            dim_y: 0.0,
            dim_z: 0.0,
            volume: 0.0,
            comment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_derived() {
        let mut mesh = MeshRecord {
            id: MeshId::from_i64(1),
            project_id: ProjectId::from_i64(1),
            name: "hinge.stl".to_string(),
            file_path: "ab12-hinge.stl".to_string(),
            quantity: 4,
            printed_quantity: 0,
            dim_x: 10.0,
            dim_y: 5.0,
            dim_z: 2.0,
            volume: 74.5,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(mesh.status(), MeshStatus::Todo);

        mesh.printed_quantity = 2;
        assert_eq!(mesh.status(), MeshStatus::Partial);

        mesh.printed_quantity = 4;
        assert_eq!(mesh.status(), MeshStatus::Printed);
    }
}
