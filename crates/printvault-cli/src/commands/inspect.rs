//! Offline inspection of STL and G-code files.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use printvault_core::error::AppError;
use printvault_extract::{extract_geometry, extract_metadata};

use crate::output::{self, OutputFormat};

/// Arguments for the inspect command
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Inspect subcommand
    #[command(subcommand)]
    pub command: InspectCommand,
}

/// Inspect subcommands
#[derive(Debug, Subcommand)]
pub enum InspectCommand {
    /// Extract bounding box and volume from an STL file
    Stl {
        /// Path to the STL file
        path: String,
    },
    /// Extract print time and filament length from a G-code file
    Gcode {
        /// Path to the G-code file
        path: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct StlReport {
    path: String,
    dim_x_mm: f64,
    dim_y_mm: f64,
    dim_z_mm: f64,
    volume_mm3: f64,
    volume_cm3: f64,
}

#[derive(Debug, Serialize, Tabled)]
struct GcodeReport {
    path: String,
    print_time_seconds: i32,
    filament_length_mm: f64,
}

/// Execute inspect commands
pub async fn execute(args: &InspectArgs, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        InspectCommand::Stl { path } => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| AppError::validation(format!("Cannot read '{path}': {e}")))?;
            let geometry = extract_geometry(&bytes);
            output::print_report(
                &StlReport {
                    path: path.clone(),
                    dim_x_mm: geometry.dim_x,
                    dim_y_mm: geometry.dim_y,
                    dim_z_mm: geometry.dim_z,
                    volume_mm3: geometry.volume,
                    volume_cm3: geometry.volume / 1000.0,
                },
                format,
            );
        }
        InspectCommand::Gcode { path } => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AppError::validation(format!("Cannot read '{path}': {e}")))?;
            let metadata = extract_metadata(&text);
            output::print_report(
                &GcodeReport {
                    path: path.clone(),
                    print_time_seconds: metadata.print_time_seconds,
                    filament_length_mm: metadata.filament_length_mm,
                },
                format,
            );
        }
    }
    Ok(())
}
