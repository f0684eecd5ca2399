//! # printvault-service
//!
//! Business logic for PrintVault, layered over the project store and the
//! storage provider:
//!
//! - [`VersionService`] — project lineages: create, branch, default
//!   selection, deletion policy.
//! - [`MeshService`] — STL ingestion (upload, copy/link import, folder
//!   scan) and print-progress tracking.
//! - [`ToolpathService`] — G-code ingestion and metadata capture.
//! - [`FileReferenceService`] — the reference-counted physical deletion
//!   gate every logical delete routes through.

pub mod mesh;
pub mod reference;
pub mod toolpath;
pub mod version;

pub use mesh::{ImportMode, MeshService, ScanReport};
pub use reference::FileReferenceService;
pub use toolpath::ToolpathService;
pub use version::{CreateProjectRequest, VersionService};
