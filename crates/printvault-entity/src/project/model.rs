//! Project entity model.
//!
//! A `Project` row is one *version* within a lineage. The lineage root has
//! no parent; every derived version points back at the root (the tree is
//! deliberately flat — there is no version-of-a-version nesting).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use printvault_core::types::ProjectId;

/// A 3D-print project version.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Project name (shared across the lineage).
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Workflow status (e.g., "active", "archived").
    pub status: String,
    /// Free-text theme tag.
    pub theme: Option<String>,
    /// Optional category label.
    pub category: Option<String>,
    /// Optional external folder used as a scan root.
    pub local_folder_path: Option<String>,
    /// Human-readable version label (e.g., "v2", "reinforced base").
    pub version_name: String,
    /// Ordering of this version within its lineage.
    pub version_number: i32,
    /// Whether this version is the lineage default.
    pub is_default: bool,
    /// The lineage root, or `None` if this project *is* the root.
    pub parent_project_id: Option<ProjectId>,
    /// Default filament choice for this version (settings entity id).
    pub filament_id: Option<i64>,
    /// Default printer choice for this version (settings entity id).
    pub printer_id: Option<i64>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The position of a project within its lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRole {
    /// This project is the lineage root.
    Root,
    /// This project is a derived version of the given root.
    Branch(ProjectId),
}

impl Project {
    /// The id of this project's lineage root (itself if it is the root).
    pub fn root_id(&self) -> ProjectId {
        self.parent_project_id.unwrap_or(self.id)
    }

    /// Whether this project is a lineage root.
    pub fn is_root(&self) -> bool {
        self.parent_project_id.is_none()
    }

    /// The lineage role of this project as a tagged value.
    pub fn role(&self) -> VersionRole {
        match self.parent_project_id {
            None => VersionRole::Root,
            Some(root) => VersionRole::Branch(root),
        }
    }
}

/// Data required to create a new project row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: String,
    /// Free-text theme tag.
    pub theme: Option<String>,
    /// Optional category label.
    pub category: Option<String>,
    /// Optional external scan root.
    pub local_folder_path: Option<String>,
    /// Version label.
    pub version_name: String,
    /// Version ordering within the lineage.
    pub version_number: i32,
    /// Whether this version is the lineage default.
    pub is_default: bool,
    /// Lineage root id for derived versions, `None` for roots.
    pub parent_project_id: Option<ProjectId>,
    /// Default filament choice.
    pub filament_id: Option<i64>,
    /// Default printer choice.
    pub printer_id: Option<i64>,
}

/// Lineage listing entry: one version's identity and default flag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionInfo {
    /// Project id of this version.
    pub id: ProjectId,
    /// Human-readable version label.
    pub version_name: String,
    /// Ordering within the lineage.
    pub version_number: i32,
    /// Whether this version is the lineage default.
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64, parent: Option<i64>) -> Project {
        Project {
            id: ProjectId::from_i64(id),
            name: "bracket".to_string(),
            description: None,
            status: "active".to_string(),
            theme: None,
            category: None,
            local_folder_path: None,
            version_name: "v1".to_string(),
            version_number: 1,
            is_default: parent.is_none(),
            parent_project_id: parent.map(ProjectId::from_i64),
            filament_id: None,
            printer_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_root_role() {
        let root = project(1, None);
        assert!(root.is_root());
        assert_eq!(root.root_id(), ProjectId::from_i64(1));
        assert_eq!(root.role(), VersionRole::Root);
    }

    #[test]
    fn test_branch_role() {
        let branch = project(5, Some(1));
        assert!(!branch.is_root());
        assert_eq!(branch.root_id(), ProjectId::from_i64(1));
        assert_eq!(branch.role(), VersionRole::Branch(ProjectId::from_i64(1)));
    }
}
