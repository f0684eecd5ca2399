//! CLI command definitions and dispatch.

pub mod inspect;
pub mod mesh;
pub mod migrate;
pub mod project;
pub mod toolpath;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use printvault_core::config::AppConfig;
use printvault_core::error::AppError;
use printvault_core::traits::StorageProvider;
use printvault_database::{PgProjectStore, ProjectStore, connection};
use printvault_service::{
    FileReferenceService, MeshService, ToolpathService, VersionService,
};
use printvault_storage::LocalStorageProvider;

use crate::output::OutputFormat;

/// PrintVault — 3D print project tracking
#[derive(Debug, Parser)]
#[command(name = "printvault", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (config/<env>.toml overlay)
    #[arg(short, long, default_value = "default")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect STL / G-code files without touching the database
    Inspect(inspect::InspectArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Project and version management
    Project(project::ProjectArgs),
    /// Mesh management
    Mesh(mesh::MeshArgs),
    /// Toolpath management
    Toolpath(toolpath::ToolpathArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Inspect(args) => inspect::execute(args, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Project(args) => project::execute(args, &self.env, self.format).await,
            Commands::Mesh(args) => mesh::execute(args, &self.env, self.format).await,
            Commands::Toolpath(args) => toolpath::execute(args, &self.env, self.format).await,
        }
    }
}

/// The wired-up service layer used by database-backed commands.
pub struct ServiceContext {
    pub store: Arc<dyn ProjectStore>,
    pub versions: VersionService,
    pub meshes: MeshService,
    pub toolpaths: ToolpathService,
}

/// Load configuration for the given environment.
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Connect to the database and storage root and build the services.
pub async fn connect_services(config: &AppConfig) -> Result<ServiceContext, AppError> {
    let pool = connection::connect(&config.database).await?;
    let store: Arc<dyn ProjectStore> = Arc::new(PgProjectStore::new(pool));
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    let references = Arc::new(FileReferenceService::new(store.clone(), storage.clone()));

    Ok(ServiceContext {
        versions: VersionService::new(
            store.clone(),
            references.clone(),
            config.versioning.clone(),
        ),
        meshes: MeshService::new(
            store.clone(),
            storage.clone(),
            references.clone(),
            config.storage.clone(),
        ),
        toolpaths: ToolpathService::new(
            store.clone(),
            storage,
            references,
            config.storage.clone(),
        ),
        store,
    })
}
