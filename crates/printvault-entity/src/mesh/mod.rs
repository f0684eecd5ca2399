//! Mesh record entity.

pub mod model;
pub mod status;

pub use model::{CreateMesh, MeshRecord};
pub use status::MeshStatus;
