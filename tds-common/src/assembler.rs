//! Hand-off boundary between the decoder and whatever builds renderable meshes
//!
//! The loader produces one [`MeshObject`] per object block, in the order the
//! blocks appeared in the stream. What happens next (scene graphs, materials,
//! GPU upload) belongs to the [`MeshAssembler`] implementation.

/// Geometry of one decoded object.
///
/// Invariants once handed off:
/// - `vertices`, `normals` and `tex_coords` have the same length
/// - `indices.len() == 3 * face_flags.len()`
/// - every index is `< vertices.len()`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshObject {
    /// Object name from the object block
    pub name: String,
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Triangle corners, three per triangle
    pub indices: Vec<u16>,
    /// UVs with V already flipped to the top-left origin; zero-filled if the file had none
    pub tex_coords: Vec<[f32; 2]>,
    /// Smoothed per-vertex normals (unit length, or exactly zero for isolated vertices)
    pub normals: Vec<[f32; 3]>,
    /// Per-triangle edge visibility / wrap flags as stored in the file
    pub face_flags: Vec<u16>,
}

impl MeshObject {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Corner indices of triangle `t`
    #[inline]
    pub fn triangle(&self, t: usize) -> [u16; 3] {
        let base = t * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }
}

/// Consumer of completed objects
pub trait MeshAssembler {
    type Error;

    /// Take ownership of one finished object
    fn assemble(&mut self, object: MeshObject) -> Result<(), Self::Error>;
}

/// Collecting into a vector is the trivial assembler
impl MeshAssembler for Vec<MeshObject> {
    type Error = std::convert::Infallible;

    fn assemble(&mut self, object: MeshObject) -> Result<(), Self::Error> {
        self.push(object);
        Ok(())
    }
}
