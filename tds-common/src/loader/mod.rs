//! Streaming 3DS geometry loader
//!
//! One linear pass over a byte stream, no seeking:
//!
//! - [`reader`] - little-endian scalars, C strings, bulk arrays
//! - [`chunk`] - chunk headers, kinds and the skipping cursor
//! - `dispatcher` - the flat traversal loop
//! - `geometry` - per-object buffers and smoothed normals
//!
//! A [`Loader`] owns the geometry buffers of one in-flight parse and needs
//! `&mut self` to run, so a single instance cannot be shared between
//! concurrent parses. Use one loader per stream.

pub mod chunk;
mod dispatcher;
mod geometry;
pub mod reader;

use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

use crate::assembler::{MeshAssembler, MeshObject};
use crate::error::LoadError;
use dispatcher::ParseSession;
use geometry::GeometryAccumulator;

pub use chunk::{ChunkHeader, ChunkKind, chunk_ids};

/// Loader behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Store V as `1 - v` (3DS puts the UV origin bottom-left).
    /// Default: true
    pub flip_v: bool,

    /// Fail when an object's UV count differs from its vertex count.
    /// When false the UVs are padded with zeros or cut to fit.
    /// Default: true
    pub strict_tex_coords: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            flip_v: true,
            strict_tex_coords: true,
        }
    }
}

/// Failure of [`Loader::parse_into`]: either decoding or the assembler failed
#[derive(Debug, Error)]
pub enum AssembleError<E> {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Mesh assembly failed: {0}")]
    Assemble(#[source] E),
}

/// 3DS mesh loader
#[derive(Debug, Default)]
pub struct Loader {
    options: LoadOptions,
    geometry: GeometryAccumulator,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            geometry: GeometryAccumulator::new(),
        }
    }

    /// Decode a whole stream and return its objects in file order.
    ///
    /// On any error the partially filled buffers are discarded; nothing is
    /// returned for a stream that fails the magic check.
    pub fn parse<R: Read>(&mut self, reader: R) -> Result<Vec<MeshObject>, LoadError> {
        self.geometry.clear();

        let mut session = ParseSession::new(reader);
        let decoded = session
            .open()
            .and_then(|()| session.run(&mut self.geometry, &self.options));

        if let Err(e) = decoded {
            self.geometry.clear();
            return Err(e);
        }

        let objects = self.geometry.finish(self.options.strict_tex_coords)?;
        tracing::debug!(objects = objects.len(), "Parsed 3DS stream");
        Ok(objects)
    }

    /// Decode a stream and hand each object to `assembler` in file order.
    ///
    /// Returns the number of objects assembled.
    pub fn parse_into<R: Read, A: MeshAssembler>(
        &mut self,
        reader: R,
        assembler: &mut A,
    ) -> Result<usize, AssembleError<A::Error>> {
        let objects = self.parse(reader)?;
        let count = objects.len();
        for object in objects {
            assembler.assemble(object).map_err(AssembleError::Assemble)?;
        }
        Ok(count)
    }

    /// Open `path`, decode it and close it again on every exit path
    pub fn load_file(&mut self, path: &Path) -> Result<Vec<MeshObject>, LoadError> {
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "Loading 3DS file");
        self.parse(BufReader::new(file))
    }

    /// Drop any buffered geometry
    pub fn clear(&mut self) {
        self.geometry.clear();
    }
}
