//! Mesh management commands.

use bytes::Bytes;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use printvault_core::error::AppError;
use printvault_core::types::{MeshId, ProjectId};
use printvault_entity::mesh::MeshRecord;
use printvault_service::ImportMode;
use printvault_storage::path;

use crate::output::{self, OutputFormat};

/// Arguments for the mesh command
#[derive(Debug, Args)]
pub struct MeshArgs {
    /// Mesh subcommand
    #[command(subcommand)]
    pub command: MeshCommand,
}

/// How scanned or imported files are brought in
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportModeArg {
    /// Copy the bytes into the storage root
    Copy,
    /// Record the absolute source path without copying
    Link,
}

impl From<ImportModeArg> for ImportMode {
    fn from(mode: ImportModeArg) -> Self {
        match mode {
            ImportModeArg::Copy => ImportMode::Copy,
            ImportModeArg::Link => ImportMode::Link,
        }
    }
}

/// Mesh subcommands
#[derive(Debug, Subcommand)]
pub enum MeshCommand {
    /// Upload an STL file onto a project
    Upload {
        /// Target project id
        project_id: i64,
        /// Path to the STL file
        path: String,
    },
    /// Import an STL file by copy or link
    Import {
        /// Target project id
        project_id: i64,
        /// Path to the STL file
        path: String,
        /// Import mode
        #[arg(long, value_enum, default_value = "copy")]
        mode: ImportModeArg,
    },
    /// Scan a folder for STL files and import the new ones
    Scan {
        /// Target project id
        project_id: i64,
        /// Folder to scan
        folder: String,
        /// Import mode
        #[arg(long, value_enum, default_value = "copy")]
        mode: ImportModeArg,
    },
    /// List a project's mesh records
    List {
        /// Project id
        project_id: i64,
    },
    /// Record print progress on a mesh
    Printed {
        /// Mesh id
        mesh_id: i64,
        /// Completed print count
        count: i32,
    },
    /// Delete a mesh record and its toolpaths
    Delete {
        /// Mesh id
        mesh_id: i64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct MeshRow {
    id: i64,
    name: String,
    status: String,
    progress: String,
    volume_cm3: String,
    file_path: String,
}

impl From<&MeshRecord> for MeshRow {
    fn from(m: &MeshRecord) -> Self {
        Self {
            id: m.id.into_i64(),
            name: m.name.clone(),
            status: m.status().to_string(),
            progress: format!("{}/{}", m.printed_quantity, m.quantity),
            volume_cm3: format!("{:.2}", m.volume / 1000.0),
            file_path: m.file_path.clone(),
        }
    }
}

/// Execute mesh commands
pub async fn execute(args: &MeshArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let services = super::connect_services(&config).await?;

    match &args.command {
        MeshCommand::Upload { project_id, path: file } => {
            let bytes = tokio::fs::read(file)
                .await
                .map_err(|e| AppError::validation(format!("Cannot read '{file}': {e}")))?;
            let mesh = services
                .meshes
                .upload_mesh(
                    ProjectId::from_i64(*project_id),
                    path::file_name(file),
                    Bytes::from(bytes),
                )
                .await?;
            output::print_success(&format!("Uploaded mesh {} ({})", mesh.name, mesh.id));
        }
        MeshCommand::Import {
            project_id,
            path: file,
            mode,
        } => {
            let mesh = services
                .meshes
                .add_mesh_from_path(ProjectId::from_i64(*project_id), file, (*mode).into())
                .await?;
            output::print_success(&format!("Imported mesh {} ({})", mesh.name, mesh.id));
        }
        MeshCommand::Scan {
            project_id,
            folder,
            mode,
        } => {
            let report = services
                .meshes
                .scan_folder(ProjectId::from_i64(*project_id), folder, (*mode).into())
                .await?;
            output::print_scan_report(&report, format);
        }
        MeshCommand::List { project_id } => {
            let meshes = services
                .store
                .find_meshes_by_project(ProjectId::from_i64(*project_id))
                .await?;
            let rows: Vec<MeshRow> = meshes.iter().map(MeshRow::from).collect();
            output::print_list(&rows, "No meshes on this project.", format);
        }
        MeshCommand::Printed { mesh_id, count } => {
            let mesh = services
                .meshes
                .record_printed(MeshId::from_i64(*mesh_id), *count)
                .await?;
            output::print_success(&format!(
                "{}: {}/{} printed ({})",
                mesh.name,
                mesh.printed_quantity,
                mesh.quantity,
                mesh.status()
            ));
        }
        MeshCommand::Delete { mesh_id } => {
            services.meshes.delete_mesh(MeshId::from_i64(*mesh_id)).await?;
            output::print_success("Mesh deleted.");
        }
    }
    Ok(())
}
