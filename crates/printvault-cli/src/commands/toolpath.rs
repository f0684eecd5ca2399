//! Toolpath management commands.

use bytes::Bytes;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use printvault_core::error::AppError;
use printvault_core::types::{MeshId, ToolpathId};
use printvault_entity::toolpath::ToolpathRecord;
use printvault_storage::path;

use crate::output::{self, OutputFormat};

/// Arguments for the toolpath command
#[derive(Debug, Args)]
pub struct ToolpathArgs {
    /// Toolpath subcommand
    #[command(subcommand)]
    pub command: ToolpathCommand,
}

/// Toolpath subcommands
#[derive(Debug, Subcommand)]
pub enum ToolpathCommand {
    /// Upload a G-code file onto a mesh
    Upload {
        /// Target mesh id
        mesh_id: i64,
        /// Path to the G-code file
        path: String,
    },
    /// Link an external G-code file onto a mesh without copying it
    Link {
        /// Target mesh id
        mesh_id: i64,
        /// Absolute path to the G-code file
        path: String,
    },
    /// List a mesh's toolpath records
    List {
        /// Mesh id
        mesh_id: i64,
    },
    /// Delete a toolpath record
    Delete {
        /// Toolpath id
        toolpath_id: i64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ToolpathRow {
    id: i64,
    name: String,
    print_time: String,
    filament_m: String,
    file_path: String,
}

impl From<&ToolpathRecord> for ToolpathRow {
    fn from(t: &ToolpathRecord) -> Self {
        let seconds = t.print_time_seconds;
        Self {
            id: t.id.into_i64(),
            name: t.name.clone(),
            print_time: format!("{}h{:02}m", seconds / 3600, (seconds % 3600) / 60),
            filament_m: format!("{:.2}", t.filament_length_mm / 1000.0),
            file_path: t.file_path.clone(),
        }
    }
}

/// Execute toolpath commands
pub async fn execute(args: &ToolpathArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let services = super::connect_services(&config).await?;

    match &args.command {
        ToolpathCommand::Upload { mesh_id, path: file } => {
            let bytes = tokio::fs::read(file)
                .await
                .map_err(|e| AppError::validation(format!("Cannot read '{file}': {e}")))?;
            let toolpath = services
                .toolpaths
                .upload_toolpath(
                    MeshId::from_i64(*mesh_id),
                    path::file_name(file),
                    Bytes::from(bytes),
                )
                .await?;
            output::print_success(&format!(
                "Uploaded toolpath {} ({})",
                toolpath.name, toolpath.id
            ));
        }
        ToolpathCommand::Link { mesh_id, path: file } => {
            let toolpath = services
                .toolpaths
                .link_toolpath(MeshId::from_i64(*mesh_id), file)
                .await?;
            output::print_success(&format!(
                "Linked toolpath {} ({})",
                toolpath.name, toolpath.id
            ));
        }
        ToolpathCommand::List { mesh_id } => {
            let toolpaths = services
                .toolpaths
                .list_toolpaths(MeshId::from_i64(*mesh_id))
                .await?;
            let rows: Vec<ToolpathRow> = toolpaths.iter().map(ToolpathRow::from).collect();
            output::print_list(&rows, "No toolpaths on this mesh.", format);
        }
        ToolpathCommand::Delete { toolpath_id } => {
            services
                .toolpaths
                .delete_toolpath(ToolpathId::from_i64(*toolpath_id))
                .await?;
            output::print_success("Toolpath deleted.");
        }
    }
    Ok(())
}
