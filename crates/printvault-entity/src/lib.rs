//! # printvault-entity
//!
//! Domain entity models for PrintVault: projects (versions within a
//! lineage), mesh records, and toolpath records. Entities are plain
//! serde/sqlx structs; all behavior beyond derived accessors lives in
//! `printvault-service`.

pub mod mesh;
pub mod project;
pub mod toolpath;

pub use mesh::{CreateMesh, MeshRecord, MeshStatus};
pub use project::{CreateProject, Project, ProjectTree, VersionInfo, VersionRole};
pub use toolpath::{CreateToolpath, ToolpathRecord};
