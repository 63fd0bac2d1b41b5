//! 3DS chunk-stream writer
//!
//! Builds byte streams in the layout the loader reads: nested chunks whose
//! `end_offset` is patched in when the chunk is closed. Used to generate
//! fixtures for tests and tools; it does not try to produce every chunk a
//! modelling package would write.

use crate::loader::chunk_ids;

/// Incremental chunk-stream builder
#[derive(Debug, Default)]
pub struct ChunkWriter {
    buf: Vec<u8>,
    open: Vec<usize>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a chunk; its length is filled in by [`ChunkWriter::end`]
    pub fn begin(&mut self, id: u16) -> &mut Self {
        self.open.push(self.buf.len());
        self.u16(id);
        self.u32(0);
        self
    }

    /// Close the innermost open chunk
    pub fn end(&mut self) -> &mut Self {
        if let Some(start) = self.open.pop() {
            let len = (self.buf.len() - start) as u32;
            self.buf[start + 2..start + 6].copy_from_slice(&len.to_le_bytes());
        }
        self
    }

    /// Leaf chunk with a raw payload
    pub fn chunk(&mut self, id: u16, payload: &[u8]) -> &mut Self {
        self.begin(id).bytes(payload).end()
    }

    /// Header with an arbitrary `end_offset`, for malformed-input fixtures
    pub fn raw_header(&mut self, id: u16, end_offset: u32) -> &mut Self {
        self.u16(id);
        self.u32(end_offset)
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// NUL-terminated string
    pub fn cstring(&mut self, value: &str) -> &mut Self {
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        self
    }

    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Complete vertex list chunk
    ///
    /// # Panics
    ///
    /// Panics if there are more than `u16::MAX` vertices.
    pub fn vertex_list(&mut self, vertices: &[[f32; 3]]) -> &mut Self {
        self.begin(chunk_ids::VERTEX_LIST);
        self.u16(list_len(vertices.len()));
        for v in vertices {
            self.f32(v[0]).f32(v[1]).f32(v[2]);
        }
        self.end()
    }

    /// Complete face list chunk (flags written as zero, no sub-chunks)
    pub fn face_list(&mut self, faces: &[[u16; 3]]) -> &mut Self {
        self.begin(chunk_ids::FACE_LIST);
        self.u16(list_len(faces.len()));
        for f in faces {
            self.u16(f[0]).u16(f[1]).u16(f[2]).u16(0);
        }
        self.end()
    }

    /// Complete texture coordinate chunk (values written as given)
    pub fn tex_coord_list(&mut self, uvs: &[[f32; 2]]) -> &mut Self {
        self.begin(chunk_ids::TEX_COORD_LIST);
        self.u16(list_len(uvs.len()));
        for uv in uvs {
            self.f32(uv[0]).f32(uv[1]);
        }
        self.end()
    }

    /// Object block holding one triangle mesh
    pub fn mesh_object(
        &mut self,
        name: &str,
        vertices: &[[f32; 3]],
        faces: &[[u16; 3]],
        uvs: Option<&[[f32; 2]]>,
    ) -> &mut Self {
        self.begin(chunk_ids::OBJECT_BLOCK).cstring(name);
        self.begin(chunk_ids::TRI_MESH);
        self.vertex_list(vertices);
        if let Some(uvs) = uvs {
            self.tex_coord_list(uvs);
        }
        self.face_list(faces);
        self.end().end()
    }

    /// Close any chunks still open and return the bytes
    pub fn finish(mut self) -> Vec<u8> {
        while !self.open.is_empty() {
            self.end();
        }
        self.buf
    }
}

/// Element count field of a list chunk
fn list_len(len: usize) -> u16 {
    u16::try_from(len)
        .unwrap_or_else(|_| panic!("3DS list chunks hold at most 65535 entries, got {}", len))
}
