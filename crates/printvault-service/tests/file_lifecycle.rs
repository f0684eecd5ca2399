//! Reference-counted physical file lifecycle across versions.

mod common;

use common::{binary_stl, setup};

#[tokio::test]
async fn shared_path_file_survives_until_last_reference_goes() {
    let env = setup().await;
    let root = env.create_project("bracket").await;

    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    let mesh = env
        .meshes
        .upload_mesh(root.id, "hinge.stl", stl.into())
        .await
        .unwrap();
    let physical = env.storage_file(&mesh.file_path);
    assert!(physical.exists());

    let branch = env.versions.branch(root.id, "alt").await.unwrap();
    let branch_mesh = env
        .store
        .find_meshes_by_project(branch.id)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(branch_mesh.file_path, mesh.file_path);

    // First delete drops one of two references; the file stays.
    env.meshes.delete_mesh(branch_mesh.id).await.unwrap();
    assert!(physical.exists());

    // Second delete drops the last reference; the file goes.
    env.meshes.delete_mesh(mesh.id).await.unwrap();
    assert!(!physical.exists());
}

#[tokio::test]
async fn project_delete_releases_only_unreferenced_internal_files() {
    let env = setup().await;

    // An external file PrintVault must never touch.
    let external_dir = env.root.path().join("external");
    std::fs::create_dir_all(&external_dir).unwrap();
    let external = external_dir.join("vendor_part.stl");
    std::fs::write(&external, b"solid vendor\nendsolid vendor\n").unwrap();
    let external_path = external.to_string_lossy().into_owned();

    let root = env.create_project("bracket").await;
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    let internal_mesh = env
        .meshes
        .upload_mesh(root.id, "hinge.stl", stl.into())
        .await
        .unwrap();
    env.meshes
        .add_mesh_from_path(root.id, &external_path, printvault_service::ImportMode::Link)
        .await
        .unwrap();
    let physical = env.storage_file(&internal_mesh.file_path);

    // A branch shares both paths; deleting it must free nothing.
    let branch = env.versions.branch(root.id, "alt").await.unwrap();
    env.versions.delete_project(branch.id).await.unwrap();
    assert!(physical.exists());
    assert!(external.exists());

    // Deleting the root drops the last references: the internal file is
    // released, the external one is never touched.
    env.versions.delete_project(root.id).await.unwrap();
    assert!(!physical.exists());
    assert!(external.exists());
}

#[tokio::test]
async fn toolpath_delete_routes_through_the_gate() {
    let env = setup().await;
    let root = env.create_project("bracket").await;
    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    let mesh = env
        .meshes
        .upload_mesh(root.id, "hinge.stl", stl.into())
        .await
        .unwrap();
    let toolpath = env
        .toolpaths
        .upload_toolpath(mesh.id, "hinge.gcode", ";TIME:120\n".into())
        .await
        .unwrap();

    let mesh_file = env.storage_file(&mesh.file_path);
    let gcode_file = env.storage_file(&toolpath.file_path);
    assert!(gcode_file.exists());

    env.toolpaths.delete_toolpath(toolpath.id).await.unwrap();
    assert!(!gcode_file.exists());
    assert!(mesh_file.exists());
}

#[tokio::test]
async fn missing_physical_file_does_not_fail_cleanup() {
    let env = setup().await;
    let root = env.create_project("bracket").await;
    let mesh = env
        .meshes
        .upload_mesh(root.id, "hinge.stl", b"not a real mesh".as_ref().into())
        .await
        .unwrap();

    // Someone removed the file behind our back.
    std::fs::remove_file(env.storage_file(&mesh.file_path)).unwrap();

    env.meshes.delete_mesh(mesh.id).await.unwrap();
    assert!(env.store.find_mesh(mesh.id).await.unwrap().is_none());
}

#[tokio::test]
async fn undeletable_file_does_not_abort_cleanup_of_the_rest() {
    let env = setup().await;
    let root = env.create_project("bracket").await;

    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    let first = env
        .meshes
        .upload_mesh(root.id, "hinge.stl", stl.clone().into())
        .await
        .unwrap();
    let second = env
        .meshes
        .upload_mesh(root.id, "latch.stl", stl.into())
        .await
        .unwrap();

    // Replace the first file with a non-empty directory so remove_file
    // fails with something other than NotFound.
    let blocked = env.storage_file(&first.file_path);
    std::fs::remove_file(&blocked).unwrap();
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("stray"), b"x").unwrap();

    // The logical delete already committed, so physical cleanup is
    // best-effort: the blocked path is logged and skipped, the rest of
    // the paths are still released.
    env.meshes.delete_all_meshes(root.id).await.unwrap();
    assert!(env
        .store
        .find_meshes_by_project(root.id)
        .await
        .unwrap()
        .is_empty());
    assert!(blocked.exists());
    assert!(!env.storage_file(&second.file_path).exists());
}

#[tokio::test]
async fn delete_all_meshes_clears_records_and_files() {
    let env = setup().await;
    let root = env.create_project("bracket").await;

    let stl = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
    let first = env
        .meshes
        .upload_mesh(root.id, "hinge.stl", stl.clone().into())
        .await
        .unwrap();
    let second = env
        .meshes
        .upload_mesh(root.id, "latch.stl", stl.into())
        .await
        .unwrap();
    env.toolpaths
        .upload_toolpath(first.id, "hinge.gcode", ";TIME:60\n".into())
        .await
        .unwrap();

    let deleted = env.meshes.delete_all_meshes(root.id).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(env
        .store
        .find_meshes_by_project(root.id)
        .await
        .unwrap()
        .is_empty());
    assert!(!env.storage_file(&first.file_path).exists());
    assert!(!env.storage_file(&second.file_path).exists());
}
