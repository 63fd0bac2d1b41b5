//! tds-export - 3DS mesh export tool
//!
//! Converts .3ds scenes to GPU-ready packed meshes (.tdsmesh), one file per
//! object.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tds_export::{LoadOptions, manifest, mesh};

#[derive(Parser)]
#[command(name = "tds-export")]
#[command(about = "3DS mesh export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build meshes from a manifest file
    Build {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to export.toml manifest
        #[arg(default_value = "export.toml")]
        manifest: PathBuf,
    },

    /// Export the objects of a single 3DS file
    Mesh {
        /// Input .3ds file
        input: PathBuf,

        /// Output directory (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Vertex format (e.g., POS_UV_NORMAL)
        #[arg(short, long)]
        format: Option<String>,

        /// Only export these objects (repeatable)
        #[arg(long = "object")]
        objects: Vec<String>,

        /// Keep V as stored in the file instead of flipping it
        #[arg(long)]
        no_flip_v: bool,

        /// Pad or cut mismatched texture coordinates instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// List the mesh objects in a 3DS file
    Info {
        /// Input .3ds file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building meshes from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let written = manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete! {} mesh files written", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Mesh {
            input,
            output,
            format,
            objects,
            no_flip_v,
            lenient,
        } => {
            let ext = input
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_lowercase())
                .unwrap_or_default();
            if ext != "3ds" {
                anyhow::bail!("Unsupported mesh format: {:?} (use .3ds)", input);
            }

            let output = output.unwrap_or_else(|| {
                input
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default()
            });
            let options = LoadOptions {
                flip_v: !no_flip_v,
                strict_tex_coords: !lenient,
            };
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let meshes =
                mesh::convert_3ds_with_options(&input, &options, format.as_deref(), &objects)?;
            mesh::write_meshes(&meshes, &output)?;
            tracing::info!("Done!");
        }

        Commands::Info { input } => {
            mesh::list_objects(&input, &LoadOptions::default())?;
        }
    }

    Ok(())
}
