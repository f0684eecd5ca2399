//! Project and version management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use printvault_core::error::AppError;
use printvault_core::types::ProjectId;
use printvault_entity::project::{Project, VersionInfo};
use printvault_service::CreateProjectRequest;

use crate::output::{self, OutputFormat};

/// Arguments for the project command
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project subcommand
    #[command(subcommand)]
    pub command: ProjectCommand,
}

/// Project subcommands
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Category label
        #[arg(long)]
        category: Option<String>,
    },
    /// List every project (one representative version per lineage)
    List,
    /// List all versions of a project's lineage
    Versions {
        /// Project id (any member of the lineage)
        id: i64,
    },
    /// Derive a new version from an existing one
    Branch {
        /// Source project id
        id: i64,
        /// Version label (generated from the number when omitted)
        #[arg(long, default_value = "")]
        label: String,
    },
    /// Make a version its lineage's default
    SetDefault {
        /// Project id
        id: i64,
    },
    /// Delete a project version (root deletion follows the configured policy)
    Delete {
        /// Project id
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ProjectRow {
    id: i64,
    name: String,
    version: String,
    default: bool,
    status: String,
    category: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.into_i64(),
            name: p.name.clone(),
            version: p.version_name.clone(),
            default: p.is_default,
            status: p.status.clone(),
            category: p.category.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    id: i64,
    version: String,
    number: i32,
    default: bool,
}

impl From<&VersionInfo> for VersionRow {
    fn from(v: &VersionInfo) -> Self {
        Self {
            id: v.id.into_i64(),
            version: v.version_name.clone(),
            number: v.version_number,
            default: v.is_default,
        }
    }
}

/// Execute project commands
pub async fn execute(args: &ProjectArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let services = super::connect_services(&config).await?;

    match &args.command {
        ProjectCommand::Create {
            name,
            description,
            category,
        } => {
            let project = services
                .versions
                .create_project(CreateProjectRequest {
                    name: name.clone(),
                    description: description.clone(),
                    category: category.clone(),
                    ..CreateProjectRequest::default()
                })
                .await?;
            output::print_success(&format!("Created project {} ({})", project.name, project.id));
        }
        ProjectCommand::List => {
            let projects = services.versions.list_default_versions().await?;
            let rows: Vec<ProjectRow> = projects.iter().map(ProjectRow::from).collect();
            output::print_list(&rows, "No projects found.", format);
        }
        ProjectCommand::Versions { id } => {
            let versions = services
                .versions
                .list_lineage(ProjectId::from_i64(*id))
                .await?;
            let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
            output::print_list(&rows, "No versions found.", format);
        }
        ProjectCommand::Branch { id, label } => {
            let branch = services
                .versions
                .branch(ProjectId::from_i64(*id), label)
                .await?;
            output::print_success(&format!(
                "Created version '{}' ({}) of {}",
                branch.version_name, branch.id, branch.name
            ));
        }
        ProjectCommand::SetDefault { id } => {
            services
                .versions
                .set_default(ProjectId::from_i64(*id))
                .await?;
            output::print_success("Default version updated.");
        }
        ProjectCommand::Delete { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt("Delete this project version and its records?")
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            services
                .versions
                .delete_project(ProjectId::from_i64(*id))
                .await?;
            output::print_success("Project deleted.");
        }
    }
    Ok(())
}
