//! Shared fixtures for service integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use printvault_core::config::{StorageConfig, VersioningConfig};
use printvault_core::traits::StorageProvider;
use printvault_database::{MemoryProjectStore, ProjectStore};
use printvault_entity::project::Project;
use printvault_service::{
    CreateProjectRequest, FileReferenceService, MeshService, ToolpathService, VersionService,
};
use printvault_storage::LocalStorageProvider;

pub struct TestEnv {
    pub root: TempDir,
    pub store: Arc<dyn ProjectStore>,
    pub versions: VersionService,
    pub meshes: MeshService,
    pub toolpaths: ToolpathService,
}

pub async fn setup() -> TestEnv {
    setup_with(VersioningConfig::default()).await
}

pub async fn setup_with(versioning: VersioningConfig) -> TestEnv {
    build(versioning, StorageConfig::default().max_upload_size_bytes).await
}

pub async fn setup_with_upload_limit(limit: u64) -> TestEnv {
    build(VersioningConfig::default(), limit).await
}

async fn build(versioning: VersioningConfig, max_upload_size_bytes: u64) -> TestEnv {
    let root = tempfile::tempdir().unwrap();
    let storage_root = root.path().join("storage");

    let provider = LocalStorageProvider::new(storage_root.to_str().unwrap())
        .await
        .unwrap();
    let storage: Arc<dyn StorageProvider> = Arc::new(provider);
    let store: Arc<dyn ProjectStore> = Arc::new(MemoryProjectStore::new());
    let references = Arc::new(FileReferenceService::new(store.clone(), storage.clone()));

    let storage_config = StorageConfig {
        root_path: storage_root.to_string_lossy().into_owned(),
        max_upload_size_bytes,
    };

    TestEnv {
        versions: VersionService::new(store.clone(), references.clone(), versioning),
        meshes: MeshService::new(
            store.clone(),
            storage.clone(),
            references.clone(),
            storage_config.clone(),
        ),
        toolpaths: ToolpathService::new(store.clone(), storage, references, storage_config),
        store,
        root,
    }
}

impl TestEnv {
    /// Absolute path of a file stored under the managed root.
    pub fn storage_file(&self, relative: &str) -> PathBuf {
        self.root.path().join("storage").join(relative)
    }

    pub async fn create_project(&self, name: &str) -> Project {
        self.versions
            .create_project(CreateProjectRequest {
                name: name.to_string(),
                ..CreateProjectRequest::default()
            })
            .await
            .unwrap()
    }
}

/// Build a binary STL body from triangles given as `[v0, v1, v2]`.
pub fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        data.extend_from_slice(&[0u8; 12]); // normal, ignored
        for vertex in triangle {
            for coord in vertex {
                data.extend_from_slice(&coord.to_le_bytes());
            }
        }
        data.extend_from_slice(&[0u8; 2]); // attribute bytes
    }
    data
}
