//! Packed mesh file writing

pub use tds_common::formats::*;

use anyhow::Result;
use std::io::Write;

use tds_common::pack_indices;

/// Write a complete packed mesh file
///
/// Index data is written unpadded; GPU copy alignment is the runtime's job.
pub fn write_packed_mesh<W: Write>(
    w: &mut W,
    format: u8,
    vertex_data: &[u8],
    indices: &[u16],
) -> Result<()> {
    let stride = tds_common::vertex_stride_packed(format) as usize;
    let vertex_count = (vertex_data.len() / stride) as u32;

    let header = PackedMeshHeader::new(vertex_count, indices.len() as u32, format);
    w.write_all(&header.to_bytes())?;
    w.write_all(vertex_data)?;
    w.write_all(&pack_indices(indices))?;

    Ok(())
}
