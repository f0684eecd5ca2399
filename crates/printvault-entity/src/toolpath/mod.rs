//! Toolpath record entity.

pub mod model;

pub use model::{CreateToolpath, ToolpathRecord};
