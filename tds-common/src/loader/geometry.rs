//! Per-object geometry buffers and smoothed normal accumulation
//!
//! Face normals are computed while the face list is being ingested: each
//! triangle's unit normal is added to a running sum at its three corners, and
//! the sums are normalized once the list is done. Vertex normals therefore
//! weight every adjacent face equally, regardless of its area.

use glam::Vec3;

use crate::assembler::MeshObject;
use crate::error::LoadError;
use crate::loader::chunk::chunk_ids;

/// u16 values per face record: a, b, c, flags
pub(crate) const FACE_RECORD_LEN: usize = 4;

#[derive(Debug, Default)]
struct ObjectBuffers {
    name: String,
    vertices: Option<Vec<Vec3>>,
    indices: Option<Vec<u16>>,
    face_flags: Vec<u16>,
    normals: Vec<Vec3>,
    tex_coords: Option<Vec<[f32; 2]>>,
}

/// Accumulates geometry for every object of one parse
#[derive(Debug, Default)]
pub(crate) struct GeometryAccumulator {
    objects: Vec<ObjectBuffers>,
}

impl GeometryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of object blocks seen so far
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Start a new empty object; returns its ordinal
    pub fn begin_object(&mut self, name: String) -> usize {
        self.objects.push(ObjectBuffers {
            name,
            ..Default::default()
        });
        self.objects.len() - 1
    }

    /// Store `raw.len() / 3` positions for `object`
    pub fn add_vertices(&mut self, object: usize, raw: &[f32]) -> Result<(), LoadError> {
        let obj = &mut self.objects[object];
        if obj.vertices.is_some() {
            return Err(LoadError::DuplicateChunk {
                object: obj.name.clone(),
                chunk: chunk_ids::VERTEX_LIST,
            });
        }
        obj.vertices = Some(
            raw.chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect(),
        );
        Ok(())
    }

    /// Store `raw.len() / 2` UV pairs, optionally flipping V as `1 - v`
    pub fn add_tex_coords(
        &mut self,
        object: usize,
        raw: &[f32],
        flip_v: bool,
    ) -> Result<(), LoadError> {
        let obj = &mut self.objects[object];
        if obj.tex_coords.is_some() {
            return Err(LoadError::DuplicateChunk {
                object: obj.name.clone(),
                chunk: chunk_ids::TEX_COORD_LIST,
            });
        }
        obj.tex_coords = Some(
            raw.chunks_exact(2)
                .map(|uv| if flip_v { [uv[0], 1.0 - uv[1]] } else { [uv[0], uv[1]] })
                .collect(),
        );
        Ok(())
    }

    /// Ingest face records (`a, b, c, flags` each) and smooth normals in the same pass.
    ///
    /// Face normal is `normalize((v3 - v1) × (v2 - v1))`. The edge order is
    /// fixed: it decides which side of the triangle the normal points to for
    /// the file's winding.
    pub fn add_faces(&mut self, object: usize, records: &[u16]) -> Result<(), LoadError> {
        let obj = &mut self.objects[object];
        let Some(vertices) = obj.vertices.as_deref() else {
            return Err(LoadError::FacesBeforeVertices {
                object: obj.name.clone(),
            });
        };
        if obj.indices.is_some() {
            return Err(LoadError::DuplicateChunk {
                object: obj.name.clone(),
                chunk: chunk_ids::FACE_LIST,
            });
        }

        let triangle_count = records.len() / FACE_RECORD_LEN;
        let mut indices = Vec::with_capacity(triangle_count * 3);
        let mut face_flags = Vec::with_capacity(triangle_count);
        let mut sums = vec![Vec3::ZERO; vertices.len()];

        for face in records.chunks_exact(FACE_RECORD_LEN) {
            let corners = [face[0], face[1], face[2]];
            if let Some(&bad) = corners.iter().find(|&&i| usize::from(i) >= vertices.len()) {
                return Err(LoadError::IndexOutOfRange {
                    object: obj.name.clone(),
                    index: bad,
                    vertex_count: vertices.len(),
                });
            }
            let [a, b, c] = corners.map(usize::from);

            let v1 = vertices[a];
            let v2 = vertices[b];
            let v3 = vertices[c];
            let normal = normalize_wide((v3 - v1).cross(v2 - v1));

            sums[a] += normal;
            sums[b] += normal;
            sums[c] += normal;

            indices.extend_from_slice(&corners);
            face_flags.push(face[3]);
        }

        for n in &mut sums {
            *n = normalize_wide(*n);
        }

        tracing::trace!(
            object = %obj.name,
            triangles = triangle_count,
            "Accumulated face normals"
        );

        obj.indices = Some(indices);
        obj.face_flags = face_flags;
        obj.normals = sums;
        Ok(())
    }

    /// Discard every buffer
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Validate and hand over all objects, leaving the accumulator empty.
    ///
    /// Object blocks that never received a vertex list (lights, cameras) are
    /// dropped. Missing UVs are zero-filled. With `strict_tex_coords` a UV
    /// count that disagrees with the vertex count is an error; otherwise it is
    /// padded or cut to fit.
    pub fn finish(&mut self, strict_tex_coords: bool) -> Result<Vec<MeshObject>, LoadError> {
        let objects = std::mem::take(&mut self.objects);
        let mut finished = Vec::with_capacity(objects.len());

        for obj in objects {
            let Some(vertices) = obj.vertices else {
                tracing::debug!(object = %obj.name, "Object block has no vertex list, dropping");
                continue;
            };
            let vertex_count = vertices.len();

            let tex_coords = match obj.tex_coords {
                None => vec![[0.0; 2]; vertex_count],
                Some(uvs) if uvs.len() == vertex_count => uvs,
                Some(uvs) if strict_tex_coords => {
                    return Err(LoadError::TexCoordCountMismatch {
                        object: obj.name,
                        tex_coords: uvs.len(),
                        vertices: vertex_count,
                    });
                }
                Some(mut uvs) => {
                    tracing::warn!(
                        object = %obj.name,
                        tex_coords = uvs.len(),
                        vertices = vertex_count,
                        "Texture coordinate count differs from vertex count, resizing"
                    );
                    uvs.resize(vertex_count, [0.0; 2]);
                    uvs
                }
            };

            let normals = if obj.indices.is_some() {
                obj.normals.iter().map(|n| n.to_array()).collect()
            } else {
                vec![[0.0; 3]; vertex_count]
            };

            finished.push(MeshObject {
                name: obj.name,
                vertices: vertices.iter().map(|v| v.to_array()).collect(),
                indices: obj.indices.unwrap_or_default(),
                tex_coords,
                normals,
                face_flags: obj.face_flags,
            });
        }

        Ok(finished)
    }
}

/// Normalize with the magnitude computed in f64; zero stays zero
fn normalize_wide(v: Vec3) -> Vec3 {
    let wide = v.as_dvec3();
    let len = wide.length();
    if len == 0.0 {
        return v;
    }
    (wide / len).as_vec3()
}
