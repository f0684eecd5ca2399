//! Shared plain types used across PrintVault crates.

pub mod id;

pub use id::{MeshId, ProjectId, ToolpathId};
