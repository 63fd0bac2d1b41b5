//! Manifest parsing and build orchestration
//!
//! Parses export.toml and converts every listed 3DS file.
//!
//! ```toml
//! [output]
//! dir = "assets/meshes"
//!
//! [loader]
//! flip_v = true
//! strict_tex_coords = false
//!
//! [[mesh]]
//! path = "models/ship.3ds"
//! format = "POS_UV_NORMAL"
//! objects = ["Hull", "Turret"]
//! ```

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use tds_common::LoadOptions;

use crate::mesh::{convert_3ds_with_options, parse_format_string, write_meshes};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub loader: LoadOptions,
    #[serde(default)]
    pub mesh: Vec<MeshEntry>,

    /// Directory relative paths are resolved against (the manifest's own)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

/// One source file
#[derive(Debug, Deserialize)]
pub struct MeshEntry {
    pub path: PathBuf,
    /// Vertex format string, e.g. `POS_UV_NORMAL` (default: all attributes)
    #[serde(default)]
    pub format: Option<String>,
    /// Object names to export (default: every mesh in the file)
    #[serde(default)]
    pub objects: Vec<String>,
}

impl Manifest {
    /// Parse manifest text; relative paths stay relative to the working directory
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse export manifest")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Output directory, with an optional override from the command line
    pub fn output_dir(&self, output_override: Option<&Path>) -> PathBuf {
        match output_override {
            Some(dir) => dir.to_path_buf(),
            None => self.resolve(&self.output.dir),
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest = Manifest::parse(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.mesh.is_empty() {
        tracing::warn!("Manifest lists no meshes");
    }

    for entry in &manifest.mesh {
        let path = manifest.resolve(&entry.path);
        if !path.exists() {
            bail!("Mesh source not found: {:?}", path);
        }
        if let Some(format) = &entry.format {
            parse_format_string(format)
                .with_context(|| format!("Invalid format for {:?}", entry.path))?;
        }
        if entry.objects.iter().any(String::is_empty) {
            bail!("Empty object name in entry for {:?}", entry.path);
        }
    }

    Ok(())
}

/// Build all meshes from a manifest; returns the written files
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<Vec<PathBuf>> {
    validate(manifest)?;
    let output_dir = manifest.output_dir(output_override);

    // Collected first so object names stay unique across source files
    let mut meshes = Vec::new();
    for entry in &manifest.mesh {
        let path = manifest.resolve(&entry.path);
        tracing::info!("Converting 3DS: {:?}", path);
        meshes.extend(convert_3ds_with_options(
            &path,
            &manifest.loader,
            entry.format.as_deref(),
            &entry.objects,
        )?);
    }

    write_meshes(&meshes, &output_dir)
}
