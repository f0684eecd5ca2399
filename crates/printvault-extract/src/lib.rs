//! # printvault-extract
//!
//! Pure, stateless metadata extractors:
//!
//! - [`geometry::extract_geometry`] — triangle-mesh (STL) bytes to
//!   bounding-box dimensions and enclosed volume.
//! - [`toolpath::extract_metadata`] — slicer output (G-code) text to
//!   estimated print duration and filament length.
//!
//! Both are best-effort readers, not validating parsers: malformed or
//! unrecognized input degrades to zero-valued results and never errors.
//! Both are side-effect-free and safe to run on a blocking worker thread.

pub mod geometry;
pub mod toolpath;

pub use geometry::{MeshGeometry, extract_geometry};
pub use toolpath::{ToolpathMetadata, extract_metadata};
