//! STL / G-code ingestion: uploads, imports, and folder scanning.

mod common;

use printvault_core::error::ErrorKind;
use printvault_entity::mesh::MeshStatus;
use printvault_service::ImportMode;

use common::{binary_stl, setup};

fn write_model_folder(dir: &std::path::Path, files: &[(&str, &[u8])]) {
    std::fs::create_dir_all(dir).unwrap();
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}

#[tokio::test]
async fn upload_extracts_geometry_and_stores_under_unique_name() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    let mesh = env
        .meshes
        .upload_mesh(project.id, "hinge.stl", stl.into())
        .await
        .unwrap();

    assert_eq!(mesh.name, "hinge.stl");
    assert_ne!(mesh.file_path, "hinge.stl");
    assert!(mesh.file_path.ends_with("hinge.stl"));
    assert!(env.storage_file(&mesh.file_path).exists());

    assert!((mesh.dim_x - 1.0).abs() < 1e-9);
    assert!((mesh.dim_y - 1.0).abs() < 1e-9);
    assert!(mesh.dim_z.abs() < 1e-9);
    assert!(mesh.volume.abs() < 1e-9);
    assert_eq!(mesh.status(), MeshStatus::Todo);
}

#[tokio::test]
async fn malformed_upload_still_creates_a_record() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let mesh = env
        .meshes
        .upload_mesh(project.id, "broken.stl", b"garbage".as_ref().into())
        .await
        .unwrap();
    assert_eq!(mesh.dim_x, 0.0);
    assert_eq!(mesh.volume, 0.0);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let env = common::setup_with_upload_limit(64).await;
    let project = env.create_project("bracket").await;

    let err = env
        .meshes
        .upload_mesh(project.id, "huge.stl", vec![0u8; 65].into())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn link_import_keeps_the_source_in_place() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let models = env.root.path().join("models");
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]]);
    write_model_folder(&models, &[("panel.stl", &stl)]);
    let source = models.join("panel.stl").to_string_lossy().into_owned();

    let mesh = env
        .meshes
        .add_mesh_from_path(project.id, &source, ImportMode::Link)
        .await
        .unwrap();

    assert_eq!(mesh.file_path, source);
    assert!((mesh.dim_x - 2.0).abs() < 1e-9);

    env.meshes.delete_mesh(mesh.id).await.unwrap();
    assert!(models.join("panel.stl").exists());
}

#[tokio::test]
async fn copy_import_duplicates_into_the_storage_root() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let models = env.root.path().join("models");
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    write_model_folder(&models, &[("panel.stl", &stl)]);
    let source = models.join("panel.stl").to_string_lossy().into_owned();

    let mesh = env
        .meshes
        .add_mesh_from_path(project.id, &source, ImportMode::Copy)
        .await
        .unwrap();

    assert!(mesh.file_path.ends_with("panel.stl"));
    assert!(env.storage_file(&mesh.file_path).exists());

    // The copy is independent of the source.
    env.meshes.delete_mesh(mesh.id).await.unwrap();
    assert!(!env.storage_file(&mesh.file_path).exists());
    assert!(models.join("panel.stl").exists());
}

#[tokio::test]
async fn scan_imports_new_meshes_and_pairs_single_gcode_match() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let models = env.root.path().join("models");
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    write_model_folder(
        &models,
        &[
            ("hinge.stl", &stl),
            ("latch.stl", &stl),
            ("hinge_02mm.gcode", b";TIME:120\n;Filament used: 2.5m\n"),
            ("notes.txt", b"not a model"),
        ],
    );

    let report = env
        .meshes
        .scan_folder(project.id, models.to_str().unwrap(), ImportMode::Copy)
        .await
        .unwrap();

    assert_eq!(report.imported, vec!["hinge.stl", "latch.stl"]);
    assert!(report.skipped.is_empty());
    assert!(report.warnings.is_empty());

    let meshes = env.store.find_meshes_by_project(project.id).await.unwrap();
    assert_eq!(meshes.len(), 2);

    let hinge = meshes.iter().find(|m| m.name == "hinge.stl").unwrap();
    let toolpaths = env.store.find_toolpaths_by_mesh(hinge.id).await.unwrap();
    assert_eq!(toolpaths.len(), 1);
    assert_eq!(toolpaths[0].print_time_seconds, 120);
    assert!((toolpaths[0].filament_length_mm - 2500.0).abs() < 1e-6);

    let latch = meshes.iter().find(|m| m.name == "latch.stl").unwrap();
    assert!(env
        .store
        .find_toolpaths_by_mesh(latch.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn rescan_skips_meshes_the_project_already_has() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let models = env.root.path().join("models");
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    write_model_folder(&models, &[("hinge.stl", &stl)]);

    let folder = models.to_str().unwrap();
    env.meshes
        .scan_folder(project.id, folder, ImportMode::Copy)
        .await
        .unwrap();
    let second = env
        .meshes
        .scan_folder(project.id, folder, ImportMode::Copy)
        .await
        .unwrap();

    assert!(second.imported.is_empty());
    assert_eq!(second.skipped, vec!["hinge.stl"]);
    assert_eq!(
        env.store
            .find_meshes_by_project(project.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn ambiguous_gcode_match_warns_instead_of_guessing() {
    let env = setup().await;
    let project = env.create_project("bracket").await;

    let models = env.root.path().join("models");
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    write_model_folder(
        &models,
        &[
            ("hinge.stl", &stl),
            ("hinge_draft.gcode", b";TIME:60\n"),
            ("hinge_final.gcode", b";TIME:90\n"),
        ],
    );

    let report = env
        .meshes
        .scan_folder(project.id, models.to_str().unwrap(), ImportMode::Link)
        .await
        .unwrap();

    assert_eq!(report.imported, vec!["hinge.stl"]);
    assert_eq!(report.warnings.len(), 1);

    let meshes = env.store.find_meshes_by_project(project.id).await.unwrap();
    assert!(env
        .store
        .find_toolpaths_by_mesh(meshes[0].id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn print_progress_is_clamped_and_status_derived() {
    let env = setup().await;
    let project = env.create_project("bracket").await;
    let mesh = env
        .meshes
        .upload_mesh(project.id, "hinge.stl", b"solid\nendsolid\n".as_ref().into())
        .await
        .unwrap();

    let mesh = env.meshes.update_quantity(mesh.id, 4).await.unwrap();
    assert_eq!(mesh.quantity, 4);

    let mesh = env.meshes.record_printed(mesh.id, 99).await.unwrap();
    assert_eq!(mesh.printed_quantity, 4);
    assert_eq!(mesh.status(), MeshStatus::Printed);

    let mesh = env.meshes.record_printed(mesh.id, -3).await.unwrap();
    assert_eq!(mesh.printed_quantity, 0);
    assert_eq!(mesh.status(), MeshStatus::Todo);

    let mesh = env.meshes.record_printed(mesh.id, 2).await.unwrap();
    assert_eq!(mesh.status(), MeshStatus::Partial);

    // Lowering the target clamps recorded progress down with it.
    let mesh = env.meshes.update_quantity(mesh.id, 1).await.unwrap();
    assert_eq!(mesh.printed_quantity, 1);

    let err = env.meshes.update_quantity(mesh.id, 0).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn linked_toolpath_reads_metadata_from_source() {
    let env = setup().await;
    let project = env.create_project("bracket").await;
    let mesh = env
        .meshes
        .upload_mesh(project.id, "hinge.stl", b"solid\nendsolid\n".as_ref().into())
        .await
        .unwrap();

    let models = env.root.path().join("models");
    write_model_folder(
        &models,
        &[("hinge.gcode", b";TIME:3661\n; Filament used [m] = 1.234\n")],
    );
    let source = models.join("hinge.gcode").to_string_lossy().into_owned();

    let toolpath = env
        .toolpaths
        .link_toolpath(mesh.id, &source)
        .await
        .unwrap();
    assert_eq!(toolpath.file_path, source);
    assert_eq!(toolpath.print_time_seconds, 3661);
    assert!((toolpath.filament_length_mm - 1234.0).abs() < 1e-6);
}
