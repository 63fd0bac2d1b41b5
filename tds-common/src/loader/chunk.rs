//! Chunk headers, chunk kinds and the cursor that walks them
//!
//! # Layout
//! ```text
//! 0x00: id         u16
//! 0x02: end_offset u32  (bytes from 0x00 to the end of the chunk, header included)
//! 0x06: payload / child chunks
//! ```

use std::io::Read;

use crate::error::LoadError;
use crate::loader::reader::PrimitiveReader;

/// Known 3DS chunk identifiers
pub mod chunk_ids {
    /// File magic, must be the first chunk
    pub const MAIN: u16 = 0x4D4D;
    /// 3D editor / mesh container
    pub const EDITOR: u16 = 0x3D3D;
    pub const OBJECT_BLOCK: u16 = 0x4000;
    pub const TRI_MESH: u16 = 0x4100;
    pub const VERTEX_LIST: u16 = 0x4110;
    pub const FACE_LIST: u16 = 0x4120;
    pub const FACE_MATERIAL: u16 = 0x4130;
    pub const TEX_COORD_LIST: u16 = 0x4140;
    pub const MATERIAL_NAME: u16 = 0xA000;
    pub const TEXTURE_MAP: u16 = 0xA200;
    pub const TEXTURE_FILENAME: u16 = 0xA300;
    pub const MATERIAL_BLOCK: u16 = 0xAFFF;
}

/// Size of a chunk header on the wire
pub const HEADER_SIZE: u32 = 6;

/// One chunk header as read from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: u16,
    pub end_offset: u32,
}

impl ChunkHeader {
    pub fn kind(&self) -> ChunkKind {
        ChunkKind::from_id(self.id)
    }

    /// Declared payload length (saturating for `end_offset < 6`)
    pub fn payload_len(&self) -> u32 {
        self.end_offset.saturating_sub(HEADER_SIZE)
    }
}

/// What a chunk carries, by id.
///
/// Containers carry no payload of their own: their children start right
/// after the header, so the flat loop descends simply by reading the next
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// 0x4D4D, container
    Main,
    /// 0x3D3D, container
    Editor,
    /// 0x4000: NUL-terminated name, then children
    ObjectBlock,
    /// 0x4100, container
    TriMesh,
    /// 0x4110: `u16 count`, `count × (f32, f32, f32)`
    VertexList,
    /// 0x4120: `u16 count`, `count × (u16 a, u16 b, u16 c, u16 flags)`, then children
    FaceList,
    /// 0x4140: `u16 count`, `count × (f32, f32)`
    TexCoordList,
    /// 0xAFFF, container
    MaterialBlock,
    /// 0xA200, container
    TextureMap,
    /// 0xA000, recognized but skipped
    MaterialName,
    /// 0xA300, recognized but skipped
    TextureFilename,
    /// 0x4130, recognized but skipped
    FaceMaterial,
    /// Anything else, skipped
    Unknown(u16),
}

impl ChunkKind {
    pub fn from_id(id: u16) -> Self {
        use chunk_ids::*;
        match id {
            MAIN => ChunkKind::Main,
            EDITOR => ChunkKind::Editor,
            OBJECT_BLOCK => ChunkKind::ObjectBlock,
            TRI_MESH => ChunkKind::TriMesh,
            VERTEX_LIST => ChunkKind::VertexList,
            FACE_LIST => ChunkKind::FaceList,
            TEX_COORD_LIST => ChunkKind::TexCoordList,
            MATERIAL_BLOCK => ChunkKind::MaterialBlock,
            TEXTURE_MAP => ChunkKind::TextureMap,
            MATERIAL_NAME => ChunkKind::MaterialName,
            TEXTURE_FILENAME => ChunkKind::TextureFilename,
            FACE_MATERIAL => ChunkKind::FaceMaterial,
            other => ChunkKind::Unknown(other),
        }
    }

    /// Pure grouping chunk with no private payload
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ChunkKind::Main
                | ChunkKind::Editor
                | ChunkKind::TriMesh
                | ChunkKind::MaterialBlock
                | ChunkKind::TextureMap
        )
    }
}

/// Tracks the current chunk and whether the stream is exhausted
pub struct ChunkCursor<R: Read> {
    reader: PrimitiveReader<R>,
    current: Option<ChunkHeader>,
    chunk_start: u64,
    exhausted: bool,
}

impl<R: Read> ChunkCursor<R> {
    pub fn new(reader: PrimitiveReader<R>) -> Self {
        Self {
            reader,
            current: None,
            chunk_start: 0,
            exhausted: false,
        }
    }

    pub fn reader(&mut self) -> &mut PrimitiveReader<R> {
        &mut self.reader
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Stream offset where the current chunk's header began
    pub fn chunk_start(&self) -> u64 {
        self.chunk_start
    }

    /// Read the next 6-byte header.
    ///
    /// Returns `None` and marks the cursor exhausted when the stream has no
    /// more data. A header cut short by the end of the stream is treated the
    /// same way.
    pub fn read_header(&mut self) -> Result<Option<ChunkHeader>, LoadError> {
        let start = self.reader.position();
        let mut buf = [0u8; HEADER_SIZE as usize];
        let got = self.reader.read_up_to(&mut buf)?;

        if got < buf.len() {
            if got > 0 {
                tracing::warn!(
                    offset = start,
                    bytes = got,
                    "Stream ends inside a chunk header, stopping"
                );
            }
            self.exhausted = true;
            self.current = None;
            return Ok(None);
        }

        let header = ChunkHeader {
            id: u16::from_le_bytes([buf[0], buf[1]]),
            end_offset: u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]),
        };
        self.chunk_start = start;
        self.current = Some(header);
        Ok(Some(header))
    }

    /// Bytes of the current chunk not yet consumed
    pub fn remaining(&self) -> u64 {
        let Some(header) = self.current else {
            return 0;
        };
        let end = self.chunk_start + u64::from(HEADER_SIZE + header.payload_len());
        end.saturating_sub(self.reader.position())
    }

    /// Discard whatever is left of the current chunk.
    ///
    /// Stops early, without failing, if the stream runs out.
    pub fn skip_to_end(&mut self) -> Result<(), LoadError> {
        let wanted = self.remaining();
        if wanted == 0 {
            return Ok(());
        }
        let skipped = self.reader.skip_bytes(wanted)?;
        if skipped < wanted {
            tracing::warn!(
                chunk_id = self.current.map_or(0, |h| h.id),
                wanted,
                skipped,
                "Stream ends inside a skipped chunk"
            );
            self.exhausted = true;
        }
        Ok(())
    }
}
