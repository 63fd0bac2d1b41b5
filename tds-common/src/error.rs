//! Loader error types

use thiserror::Error;

/// Errors produced while decoding a 3DS chunk stream.
///
/// Every variant is terminal to the current parse. None of them panic; the
/// caller decides whether to retry with another stream.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream held no bytes where the opening header was expected
    #[error("Stream ended before the first chunk header")]
    TruncatedHeader,

    /// First chunk id is not the 3DS magic
    #[error("Not a 3DS stream: first chunk id is 0x{found:04X}, expected 0x4D4D")]
    NotThreeDs { found: u16 },

    /// Stream ended inside a structured record
    #[error("Truncated data at offset 0x{offset:X}: needed {needed} bytes, got {available}")]
    Truncated {
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// Geometry chunk appeared before any object block
    #[error("Chunk 0x{chunk:04X} appeared outside of an object block")]
    NoCurrentObject { chunk: u16 },

    /// Face list arrived before the object's vertex list
    #[error("Object '{object}' has a face list before its vertex list")]
    FacesBeforeVertices { object: String },

    /// Face index does not address a vertex of the current object
    #[error("Object '{object}' references vertex {index}, but only {vertex_count} exist")]
    IndexOutOfRange {
        object: String,
        index: u16,
        vertex_count: usize,
    },

    /// Same geometry chunk kind seen twice for one object
    #[error("Object '{object}' has more than one 0x{chunk:04X} chunk")]
    DuplicateChunk { object: String, chunk: u16 },

    /// UV count disagrees with the vertex count at hand-off
    #[error("Object '{object}' has {tex_coords} texture coordinates for {vertices} vertices")]
    TexCoordCountMismatch {
        object: String,
        tex_coords: usize,
        vertices: usize,
    },

    /// Leaf payload is longer than the chunk's declared length
    #[error("Chunk 0x{chunk:04X} declares {declared} bytes but its payload needs {consumed}")]
    ChunkOverrun {
        chunk: u16,
        declared: u32,
        consumed: u64,
    },
}

impl LoadError {
    /// True when the stream is simply not a 3DS file (caller may try another loader)
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, LoadError::NotThreeDs { .. })
    }
}
