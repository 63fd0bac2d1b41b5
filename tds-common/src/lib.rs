//! Shared decoding and packing for 3DS mesh assets
//!
//! This crate provides the pieces shared between:
//! - `tds-export` (asset pipeline and CLI)
//! - any host that wants per-object geometry out of a `.3ds` stream
//!
//! # Modules
//!
//! - [`loader`] - Streaming chunk decoder (primitive reads, chunk traversal,
//!   geometry accumulation with smoothed normals)
//! - [`assembler`] - Hand-off boundary for decoded objects
//! - [`writer`] - Chunk-stream writer for fixtures and tests
//! - [`packing`] - Vertex data packing utilities (f32 → f16/unorm16/octahedral)
//! - [`formats`] - Packed GPU mesh format

pub mod assembler;
pub mod error;
pub mod formats;
pub mod loader;
pub mod packing;
pub mod writer;

pub use assembler::{MeshAssembler, MeshObject};
pub use error::LoadError;
pub use loader::{ChunkHeader, ChunkKind, LoadOptions, Loader, chunk_ids};
pub use writer::ChunkWriter;

// Re-export commonly used packing items
pub use packing::{
    FORMAT_ALL, FORMAT_NORMAL, FORMAT_UV, format_name, pack_indices, pack_normal_octahedral,
    pack_position_f16, pack_uv_unorm16, pack_vertex_data, unpack_octahedral_u32,
    vertex_stride_packed,
};

pub use formats::{PACKED_MESH_EXTENSION, PackedMeshHeader};
