//! Toolpath record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use printvault_core::types::{MeshId, ToolpathId};

/// A logical toolpath (slicer output / G-code) record owned by a mesh.
///
/// The process fields (temperatures, per-unit costs) are opaque scalars
/// carried through branching; PrintVault never computes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ToolpathRecord {
    /// Unique toolpath identifier.
    pub id: ToolpathId,
    /// The owning mesh record.
    pub mesh_id: MeshId,
    /// Logical name (usually the original file name).
    pub name: String,
    /// Relative path under the storage root, or an absolute external path.
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
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new toolpath record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateToolpath {
    /// The owning mesh record.
    pub mesh_id: MeshId,
    /// Logical name.
    pub name: String,
    /// Relative internal path or absolute external path.
    pub file_path: String,
    /// Estimated print duration in seconds.
    pub print_time_seconds: i32,
    /// Estimated filament length in millimeters.
    pub filament_length_mm: f64,
    /// Nozzle temperature in °C.
    pub nozzle_temp: Option<i32>,
    /// Bed temperature in °C.
    pub bed_temp: Option<i32>,
    /// Per-unit electricity cost.
    pub cost_electricity: Option<f64>,
    /// Per-unit machine cost.
    pub cost_machine: Option<f64>,
    /// Per-unit filament cost.
    pub cost_filament: Option<f64>,
    /// Filament choice.
    pub filament_id: Option<i64>,
}

impl CreateToolpath {
    /// A toolpath record carrying only the extracted metadata.
    pub fn new(
        mesh_id: MeshId,
        name: impl Into<String>,
        file_path: impl Into<String>,
        print_time_seconds: i32,
        filament_length_mm: f64,
    ) -> Self {
        Self {
            mesh_id,
            name: name.into(),
            file_path: file_path.into(),
            print_time_seconds,
            filament_length_mm,
            nozzle_temp: None,
            bed_temp: None,
            cost_electricity: None,
            cost_machine: None,
            cost_filament: None,
            filament_id: None,
        }
    }
}
