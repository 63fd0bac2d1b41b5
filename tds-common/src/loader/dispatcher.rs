//! Flat chunk traversal
//!
//! The 3DS tree is walked without a stack: containers carry no payload, so
//! reading the next header after a container lands on its first child. Leaf
//! chunks declare their full length, so anything not understood is skipped
//! by length without knowing its structure.

use std::io::Read;

use crate::error::LoadError;
use crate::loader::LoadOptions;
use crate::loader::chunk::{ChunkCursor, ChunkHeader, ChunkKind, chunk_ids};
use crate::loader::geometry::{FACE_RECORD_LEN, GeometryAccumulator};
use crate::loader::reader::PrimitiveReader;

/// State owned by exactly one parse
pub(crate) struct ParseSession<R: Read> {
    cursor: ChunkCursor<R>,
    /// Ordinal of the object block currently being filled
    current_object: Option<usize>,
    chunks_read: usize,
    chunks_skipped: usize,
}

impl<R: Read> ParseSession<R> {
    pub fn new(reader: R) -> Self {
        Self {
            cursor: ChunkCursor::new(PrimitiveReader::new(reader)),
            current_object: None,
            chunks_read: 0,
            chunks_skipped: 0,
        }
    }

    /// Check the opening magic chunk
    pub fn open(&mut self) -> Result<(), LoadError> {
        match self.cursor.read_header()? {
            None => Err(LoadError::TruncatedHeader),
            Some(header) if header.id != chunk_ids::MAIN => {
                Err(LoadError::NotThreeDs { found: header.id })
            }
            Some(header) => {
                tracing::trace!(end_offset = header.end_offset, "3DS main chunk");
                Ok(())
            }
        }
    }

    /// Read and dispatch chunks until the stream is exhausted
    pub fn run(
        &mut self,
        geometry: &mut GeometryAccumulator,
        options: &LoadOptions,
    ) -> Result<(), LoadError> {
        while let Some(header) = self.cursor.read_header()? {
            self.chunks_read += 1;
            self.dispatch(header, geometry, options)?;
            if self.cursor.is_exhausted() {
                break;
            }
        }

        tracing::debug!(
            chunks = self.chunks_read,
            skipped = self.chunks_skipped,
            objects = geometry.object_count(),
            bytes = self.cursor.reader().position(),
            "Reached end of 3DS stream"
        );
        Ok(())
    }

    fn dispatch(
        &mut self,
        header: ChunkHeader,
        geometry: &mut GeometryAccumulator,
        options: &LoadOptions,
    ) -> Result<(), LoadError> {
        let kind = header.kind();
        tracing::trace!(
            chunk_id = header.id,
            end_offset = header.end_offset,
            ?kind,
            "Chunk"
        );

        // Children follow immediately; the next header read descends
        if kind.is_container() {
            return Ok(());
        }

        match kind {
            ChunkKind::ObjectBlock => {
                let name = self.cursor.reader().read_cstring()?;
                self.check_overrun(header)?;
                tracing::debug!(object = %name, "Object block");
                self.current_object = Some(geometry.begin_object(name));
            }

            ChunkKind::VertexList => {
                let object = self.require_object(header)?;
                let count = usize::from(self.cursor.reader().read_u16()?);
                let raw = self.cursor.reader().read_f32_array(count * 3)?;
                self.check_overrun(header)?;
                geometry.add_vertices(object, &raw)?;
                self.cursor.skip_to_end()?;
            }

            ChunkKind::FaceList => {
                let object = self.require_object(header)?;
                let count = usize::from(self.cursor.reader().read_u16()?);
                let records = self
                    .cursor
                    .reader()
                    .read_u16_array(count * FACE_RECORD_LEN)?;
                self.check_overrun(header)?;
                geometry.add_faces(object, &records)?;
                // Face material and smoothing group chunks follow as children
            }

            ChunkKind::TexCoordList => {
                let object = self.require_object(header)?;
                let count = usize::from(self.cursor.reader().read_u16()?);
                let raw = self.cursor.reader().read_f32_array(count * 2)?;
                self.check_overrun(header)?;
                geometry.add_tex_coords(object, &raw, options.flip_v)?;
                self.cursor.skip_to_end()?;
            }

            // Material and unknown leaves are skipped by length
            _ => {
                self.chunks_skipped += 1;
                self.cursor.skip_to_end()?;
            }
        }

        Ok(())
    }

    fn require_object(&self, header: ChunkHeader) -> Result<usize, LoadError> {
        self.current_object
            .ok_or(LoadError::NoCurrentObject { chunk: header.id })
    }

    /// A payload must fit inside the length its header declares
    fn check_overrun(&mut self, header: ChunkHeader) -> Result<(), LoadError> {
        let consumed = self.cursor.reader().position() - self.cursor.chunk_start();
        if consumed > u64::from(header.end_offset) {
            return Err(LoadError::ChunkOverrun {
                chunk: header.id,
                declared: header.end_offset,
                consumed,
            });
        }
        Ok(())
    }
}
