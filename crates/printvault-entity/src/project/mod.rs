//! Project (version) entity.

pub mod model;
pub mod tree;

pub use model::{CreateProject, Project, VersionInfo, VersionRole};
pub use tree::{CreateMeshTree, CreateProjectTree, CreateToolpathTree, MeshTree, ProjectTree};
