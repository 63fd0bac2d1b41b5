//! Mesh converter (.3ds -> .tdsmesh)
//!
//! A 3DS file holds any number of named objects; each one becomes its own
//! packed mesh file named after the object.

use anyhow::{Context, Result, bail};
use hashbrown::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use tds_common::{
    FORMAT_ALL, FORMAT_NORMAL, FORMAT_UV, LoadOptions, Loader, MeshAssembler, MeshObject,
    PACKED_MESH_EXTENSION, format_name, pack_vertex_data, vertex_stride_packed,
};

use crate::formats::write_packed_mesh;

/// Result of in-memory mesh conversion
#[derive(Debug, Clone)]
pub struct ConvertedMesh {
    /// Object name from the 3DS file
    pub name: String,
    /// Format flags (UV, normal)
    pub format: u8,
    pub vertex_count: u32,
    pub index_count: u32,
    /// Packed vertex data
    pub vertex_data: Vec<u8>,
    /// Index data (u16)
    pub indices: Vec<u16>,
}

impl ConvertedMesh {
    fn from_object(object: MeshObject, format: u8) -> Self {
        let vertex_data = pack_vertex_data(&object, format);
        Self {
            format,
            vertex_count: object.vertices.len() as u32,
            index_count: object.indices.len() as u32,
            vertex_data,
            indices: object.indices,
            name: object.name,
        }
    }
}

/// Vertex format string that could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unknown vertex format component '{0}' (expected POS, UV or NORMAL)")]
    UnknownComponent(String),
}

/// Parse a format string such as `POS_UV_NORMAL` into format flags.
///
/// Components are separated by `_`, `|`, `,` or `+` and matched
/// case-insensitively. `POS` is accepted and implied.
pub fn parse_format_string(s: &str) -> Result<u8, FormatError> {
    let mut format = 0u8;
    for part in s
        .split(['_', '|', ',', '+'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        match part.to_uppercase().as_str() {
            "POS" | "POSITION" => {}
            "UV" => format |= FORMAT_UV,
            "NORMAL" | "NORMALS" => format |= FORMAT_NORMAL,
            _ => return Err(FormatError::UnknownComponent(part.to_string())),
        }
    }
    Ok(format)
}

/// Packs decoded objects as they come off the loader
struct PackingAssembler<'a> {
    format: u8,
    only: &'a [String],
    meshes: Vec<ConvertedMesh>,
}

impl MeshAssembler for PackingAssembler<'_> {
    type Error = std::convert::Infallible;

    fn assemble(&mut self, object: MeshObject) -> Result<(), Self::Error> {
        if !self.only.is_empty() && !self.only.contains(&object.name) {
            tracing::debug!("Skipping object '{}'", object.name);
            return Ok(());
        }
        if object.triangle_count() == 0 {
            tracing::warn!("Object '{}' has no triangles, skipping", object.name);
            return Ok(());
        }
        self.meshes.push(ConvertedMesh::from_object(object, self.format));
        Ok(())
    }
}

/// Load and pack the selected objects of a 3DS file
pub fn convert_3ds_with_options(
    input: &Path,
    options: &LoadOptions,
    format: Option<&str>,
    objects: &[String],
) -> Result<Vec<ConvertedMesh>> {
    let format = match format {
        Some(s) => parse_format_string(s)?,
        None => FORMAT_ALL,
    };

    let mut loader = Loader::with_options(options.clone());
    let file = File::open(input).with_context(|| format!("Failed to open 3DS: {:?}", input))?;
    let mut assembler = PackingAssembler {
        format,
        only: objects,
        meshes: Vec::new(),
    };
    loader
        .parse_into(BufReader::new(file), &mut assembler)
        .with_context(|| format!("Failed to load 3DS: {:?}", input))?;

    for wanted in objects {
        if !assembler.meshes.iter().any(|m| &m.name == wanted) {
            bail!("Object '{}' not found in {:?}", wanted, input);
        }
    }
    if assembler.meshes.is_empty() {
        bail!("No triangle meshes found in {:?}", input);
    }

    Ok(assembler.meshes)
}

/// Convert every mesh object of a 3DS file to in-memory packed data
pub fn convert_3ds_to_memory(input: &Path, format: Option<&str>) -> Result<Vec<ConvertedMesh>> {
    convert_3ds_with_options(input, &LoadOptions::default(), format, &[])
}

/// Convert a 3DS file, writing one `<object>.tdsmesh` per object into `output_dir`.
///
/// An empty `objects` list exports every mesh. Returns the written paths.
pub fn convert_3ds(
    input: &Path,
    output_dir: &Path,
    format: Option<&str>,
    objects: &[String],
) -> Result<Vec<PathBuf>> {
    let meshes = convert_3ds_with_options(input, &LoadOptions::default(), format, objects)?;
    write_meshes(&meshes, output_dir)
}

/// Write converted meshes into `output_dir`, one file each
pub fn write_meshes(meshes: &[ConvertedMesh], output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(meshes.len());

    for mesh in meshes {
        let stem = unique_stem(&mesh.name, &mut used);
        let output = output_dir.join(format!("{}.{}", stem, PACKED_MESH_EXTENSION));

        let file = File::create(&output)
            .with_context(|| format!("Failed to create output: {:?}", output))?;
        let mut writer = BufWriter::new(file);
        write_packed_mesh(&mut writer, mesh.format, &mesh.vertex_data, &mesh.indices)?;
        writer.flush()?;

        tracing::info!(
            "Converted mesh '{}': {} vertices, {} indices, format={}, stride={}",
            mesh.name,
            mesh.vertex_count,
            mesh.index_count,
            format_name(mesh.format),
            vertex_stride_packed(mesh.format)
        );
        written.push(output);
    }

    Ok(written)
}

/// Log the objects of a 3DS file without converting anything
pub fn list_objects(input: &Path, options: &LoadOptions) -> Result<()> {
    let objects = Loader::with_options(options.clone())
        .load_file(input)
        .with_context(|| format!("Failed to load 3DS: {:?}", input))?;

    if objects.is_empty() {
        tracing::info!("No mesh objects found in {:?}", input);
        return Ok(());
    }

    tracing::info!("Objects in {:?}:", input);
    for (i, object) in objects.iter().enumerate() {
        let textured = object.tex_coords.iter().any(|uv| *uv != [0.0, 0.0]);
        tracing::info!(
            "  [{}] '{}': {} vertices, {} triangles{}",
            i,
            object.name,
            object.vertex_count(),
            object.triangle_count(),
            if textured { ", textured" } else { "" }
        );
    }

    Ok(())
}

/// File stem for an object name: filesystem-safe and unique within one export
fn unique_stem(name: &str, used: &mut HashSet<String>) -> String {
    let mut base: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if base.is_empty() {
        base.push_str("object");
    }

    let mut stem = base.clone();
    let mut n = 2;
    while !used.insert(stem.clone()) {
        stem = format!("{}_{}", base, n);
        n += 1;
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_string() {
        assert_eq!(parse_format_string("POS_UV_NORMAL"), Ok(FORMAT_UV | FORMAT_NORMAL));
        assert_eq!(parse_format_string("pos"), Ok(0));
        assert_eq!(parse_format_string("uv|normal"), Ok(FORMAT_ALL));
        assert_eq!(parse_format_string("NORMAL"), Ok(FORMAT_NORMAL));
        assert_eq!(
            parse_format_string("POS_COLOR"),
            Err(FormatError::UnknownComponent("COLOR".into()))
        );
    }

    #[test]
    fn test_unique_stem() {
        let mut used = HashSet::new();
        assert_eq!(unique_stem("Box01", &mut used), "Box01");
        assert_eq!(unique_stem("Box01", &mut used), "Box01_2");
        assert_eq!(unique_stem("Box01", &mut used), "Box01_3");
        assert_eq!(unique_stem("my box/1", &mut used), "my_box_1");
        assert_eq!(unique_stem("", &mut used), "object");
    }

    #[test]
    fn test_convert_3ds_to_memory() {
        use tds_common::{ChunkWriter, chunk_ids};

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pair.3ds");
        let mut w = ChunkWriter::new();
        w.begin(chunk_ids::MAIN).begin(chunk_ids::EDITOR);
        let tri = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        w.mesh_object("A", &tri, &[[0, 1, 2]], None);
        w.mesh_object("B", &tri, &[[0, 2, 1]], None);
        std::fs::write(&input, w.finish()).unwrap();

        let meshes = convert_3ds_to_memory(&input, Some("POS_UV")).unwrap();
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[0].name, "A");
        assert_eq!(meshes[1].indices, vec![0, 2, 1]);
        assert_eq!(meshes[0].format, FORMAT_UV);
        assert_eq!(meshes[0].vertex_data.len(), 3 * 12);

        assert!(convert_3ds_to_memory(&input, Some("POS_TANGENT")).is_err());
        assert!(convert_3ds_to_memory(&dir.path().join("none.3ds"), None).is_err());
    }

    #[test]
    fn test_assembler_filters_and_skips_empty() {
        let only = vec!["Keep".to_string()];
        let mut assembler = PackingAssembler {
            format: FORMAT_ALL,
            only: &only,
            meshes: Vec::new(),
        };

        let triangle = MeshObject {
            name: "Keep".into(),
            vertices: vec![[0.0; 3]; 3],
            indices: vec![0, 1, 2],
            tex_coords: vec![[0.0; 2]; 3],
            normals: vec![[0.0; 3]; 3],
            face_flags: vec![0],
        };
        let other = MeshObject {
            name: "Drop".into(),
            ..triangle.clone()
        };
        let points = MeshObject {
            name: "Keep".into(),
            indices: Vec::new(),
            face_flags: Vec::new(),
            ..triangle.clone()
        };

        assembler.assemble(triangle).unwrap();
        assembler.assemble(other).unwrap();
        assembler.assemble(points).unwrap();

        assert_eq!(assembler.meshes.len(), 1);
        let mesh = &assembler.meshes[0];
        assert_eq!(mesh.vertex_count, 3);
        assert_eq!(mesh.index_count, 3);
        assert_eq!(mesh.vertex_data.len(), 3 * vertex_stride_packed(FORMAT_ALL) as usize);
    }
}
