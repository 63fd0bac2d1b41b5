//! Integration tests for tds-export
//!
//! Tests the full pipeline: generate a 3DS scene -> convert -> verify output

use std::path::Path;
use std::process::Command;

use tds_common::{ChunkWriter, FORMAT_ALL, FORMAT_NORMAL, PackedMeshHeader, chunk_ids};
use tempfile::tempdir;

const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

const CUBE_FACES: [[u16; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2],
    [4, 5, 6],
    [4, 6, 7],
    [0, 1, 5],
    [0, 5, 4],
    [2, 3, 7],
    [2, 7, 6],
    [1, 2, 6],
    [1, 6, 5],
    [0, 4, 7],
    [0, 7, 3],
];

/// Scene with a cube, a single triangle and a camera
fn generate_scene(path: &Path) {
    let mut w = ChunkWriter::new();
    w.begin(chunk_ids::MAIN).begin(chunk_ids::EDITOR);
    w.mesh_object("Cube", &CUBE_CORNERS, &CUBE_FACES, None);
    w.mesh_object(
        "Tri",
        &CUBE_CORNERS[..3],
        &[[0, 1, 2]],
        Some(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]),
    );
    w.begin(chunk_ids::OBJECT_BLOCK).cstring("Camera01");
    w.chunk(0x4700, &[0; 32]);
    std::fs::write(path, w.finish()).expect("Failed to write 3DS file");
}

fn tds_export(args: &[&str]) -> bool {
    Command::new(env!("CARGO_BIN_EXE_tds-export"))
        .args(args)
        .status()
        .expect("Failed to run tds-export")
        .success()
}

// Verify packed mesh header against the file size
fn verify_packed_mesh(data: &[u8]) -> PackedMeshHeader {
    assert!(
        data.len() >= PackedMeshHeader::SIZE,
        "Mesh data too small for header"
    );
    let header = PackedMeshHeader::from_bytes(data).expect("Failed to parse mesh header");
    assert!(header.vertex_count > 0, "Should have vertices");
    assert_eq!(
        data.len(),
        header.file_len(),
        "Mesh size mismatch (vertices: {}, indices: {}, format: {})",
        header.vertex_count,
        header.index_count,
        header.format
    );
    header
}

#[test]
fn test_mesh_command_writes_one_file_per_object() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.3ds");
    let out = dir.path().join("out");
    generate_scene(&input);

    assert!(tds_export(&[
        "mesh",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]));

    let cube = std::fs::read(out.join("Cube.tdsmesh")).expect("Cube mesh missing");
    let header = verify_packed_mesh(&cube);
    assert_eq!(header.vertex_count, 8);
    assert_eq!(header.index_count, 36);
    assert_eq!(header.format, FORMAT_ALL);

    let tri = std::fs::read(out.join("Tri.tdsmesh")).expect("Tri mesh missing");
    assert_eq!(verify_packed_mesh(&tri).index_count, 3);

    assert!(!out.join("Camera01.tdsmesh").exists());
}

#[test]
fn test_mesh_command_object_filter_and_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.3ds");
    let out = dir.path().join("out");
    generate_scene(&input);

    assert!(tds_export(&[
        "mesh",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "-f",
        "POS_NORMAL",
        "--object",
        "Tri",
    ]));

    let tri = std::fs::read(out.join("Tri.tdsmesh")).expect("Tri mesh missing");
    assert_eq!(verify_packed_mesh(&tri).format, FORMAT_NORMAL);
    assert!(!out.join("Cube.tdsmesh").exists());

    // Unknown object name fails
    assert!(!tds_export(&[
        "mesh",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--object",
        "Teapot",
    ]));
}

#[test]
fn test_mesh_command_rejects_non_3ds() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.3ds");
    std::fs::write(&input, b"not a 3ds file at all").unwrap();
    assert!(!tds_export(&["mesh", input.to_str().unwrap()]));

    let obj = dir.path().join("scene.obj");
    std::fs::write(&obj, b"v 0 0 0\n").unwrap();
    assert!(!tds_export(&["mesh", obj.to_str().unwrap()]));
}

#[test]
fn test_info_command() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.3ds");
    generate_scene(&input);

    assert!(tds_export(&["info", input.to_str().unwrap()]));
}

#[test]
fn test_build_from_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    generate_scene(&dir.path().join("scene.3ds"));
    let manifest = dir.path().join("export.toml");
    std::fs::write(
        &manifest,
        r#"
[output]
dir = "built"

[[mesh]]
path = "scene.3ds"
objects = ["Cube"]

[[mesh]]
path = "scene.3ds"
format = "POS"
"#,
    )
    .unwrap();

    assert!(tds_export(&["check", manifest.to_str().unwrap()]));
    assert!(tds_export(&["build", manifest.to_str().unwrap()]));

    let built = dir.path().join("built");
    let cube = std::fs::read(built.join("Cube.tdsmesh")).unwrap();
    assert_eq!(verify_packed_mesh(&cube).format, FORMAT_ALL);

    // Second entry's objects get distinct names
    let cube_pos = std::fs::read(built.join("Cube_2.tdsmesh")).unwrap();
    assert_eq!(verify_packed_mesh(&cube_pos).format, 0);
    assert!(built.join("Tri.tdsmesh").exists());
}

#[test]
fn test_check_fails_on_missing_source() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest = dir.path().join("export.toml");
    std::fs::write(&manifest, "[[mesh]]\npath = \"nowhere.3ds\"\n").unwrap();

    assert!(!tds_export(&["check", manifest.to_str().unwrap()]));
}
