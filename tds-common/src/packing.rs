//! Vertex data packing
//!
//! Converts decoded [`MeshObject`] attributes to the GPU layout written into
//! `.tdsmesh` files:
//! - position f32x3 → f16x4 (w = 1.0)
//! - UV f32x2 → unorm16x2
//! - normal f32x3 → octahedral u32 (2x snorm16)
//!
//! Position is always present; UVs and normals are selected with format flags.

use bytemuck::cast_slice;
use glam::Vec3;
use half::f16;

use crate::assembler::MeshObject;

/// Vertex format flag: UV coordinates
pub const FORMAT_UV: u8 = 1;
/// Vertex format flag: normals
pub const FORMAT_NORMAL: u8 = 4;
/// Every flag this format knows about
pub const FORMAT_ALL: u8 = FORMAT_UV | FORMAT_NORMAL;

/// Vertex stride in bytes for the packed format
#[inline]
pub const fn vertex_stride_packed(format: u8) -> u32 {
    let mut stride = 8; // Float16x4

    if format & FORMAT_UV != 0 {
        stride += 4; // Unorm16x2
    }
    if format & FORMAT_NORMAL != 0 {
        stride += 4; // Octahedral u32
    }

    stride
}

/// Short human-readable flag list, e.g. `POS_UV_NORMAL`
pub fn format_name(format: u8) -> String {
    let mut name = String::from("POS");
    if format & FORMAT_UV != 0 {
        name.push_str("_UV");
    }
    if format & FORMAT_NORMAL != 0 {
        name.push_str("_NORMAL");
    }
    name
}

/// Maps [-1.0, 1.0] to [-32767, 32767]
#[inline]
fn f32_to_snorm16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Pack a position to Float16x4 with w = 1.0
#[inline]
pub fn pack_position_f16(x: f32, y: f32, z: f32) -> [f16; 4] {
    [
        f16::from_f32(x),
        f16::from_f32(y),
        f16::from_f32(z),
        f16::from_f32(1.0),
    ]
}

/// Pack a UV to Unorm16x2. Values outside [0, 1] are clamped, so tiling UVs lose their repeat.
#[inline]
pub fn pack_uv_unorm16(u: f32, v: f32) -> [u16; 2] {
    [
        (u.clamp(0.0, 1.0) * 65535.0) as u16,
        (v.clamp(0.0, 1.0) * 65535.0) as u16,
    ]
}

/// Encode a direction to octahedral coordinates in [-1, 1]²
#[inline]
pub fn encode_octahedral(dir: Vec3) -> (f32, f32) {
    let dir = dir.normalize_or_zero();

    let l1_norm = dir.x.abs() + dir.y.abs() + dir.z.abs();
    if l1_norm == 0.0 {
        return (0.0, 0.0);
    }

    let mut u = dir.x / l1_norm;
    let mut v = dir.y / l1_norm;

    // Fold the lower hemisphere over the diagonals
    if dir.z < 0.0 {
        let u_abs = u.abs();
        let v_abs = v.abs();
        u = (1.0 - v_abs) * u.signum();
        v = (1.0 - u_abs) * v.signum();
    }

    (u, v)
}

/// Decode octahedral coordinates in [-1, 1]² to a unit direction
#[inline]
pub fn decode_octahedral(u: f32, v: f32) -> Vec3 {
    let mut dir = Vec3::new(u, v, 1.0 - u.abs() - v.abs());

    if dir.z < 0.0 {
        let old_x = dir.x;
        dir.x = (1.0 - dir.y.abs()) * old_x.signum();
        dir.y = (1.0 - old_x.abs()) * dir.y.signum();
    }

    dir.normalize_or_zero()
}

/// Pack a normal to an octahedral u32 (u in the low half, v in the high half).
///
/// A zero normal encodes as (0, 0), which decodes to +Z.
#[inline]
pub fn pack_normal_octahedral(nx: f32, ny: f32, nz: f32) -> u32 {
    let (u, v) = encode_octahedral(Vec3::new(nx, ny, nz));
    (f32_to_snorm16(u) as u16 as u32) | ((f32_to_snorm16(v) as u16 as u32) << 16)
}

/// Inverse of [`pack_normal_octahedral`]
#[inline]
pub fn unpack_octahedral_u32(packed: u32) -> Vec3 {
    let u = (packed & 0xFFFF) as i16 as f32 / 32767.0;
    let v = (packed >> 16) as i16 as f32 / 32767.0;
    decode_octahedral(u, v)
}

/// Pack every vertex of `object` according to `format`
pub fn pack_vertex_data(object: &MeshObject, format: u8) -> Vec<u8> {
    let stride = vertex_stride_packed(format) as usize;
    let mut packed = Vec::with_capacity(object.vertex_count() * stride);

    for (i, p) in object.vertices.iter().enumerate() {
        packed.extend_from_slice(cast_slice(&pack_position_f16(p[0], p[1], p[2])));

        if format & FORMAT_UV != 0 {
            let [u, v] = object.tex_coords.get(i).copied().unwrap_or_default();
            packed.extend_from_slice(cast_slice(&pack_uv_unorm16(u, v)));
        }

        if format & FORMAT_NORMAL != 0 {
            let [nx, ny, nz] = object.normals.get(i).copied().unwrap_or_default();
            packed.extend_from_slice(&pack_normal_octahedral(nx, ny, nz).to_le_bytes());
        }
    }

    packed
}

/// Triangle indices as little-endian u16
pub fn pack_indices(indices: &[u16]) -> Vec<u8> {
    indices.iter().flat_map(|i| i.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_position_f16() {
        let packed = pack_position_f16(1.0, -2.5, 3.0);
        assert_eq!(packed[0], f16::from_f32(1.0));
        assert_eq!(packed[1], f16::from_f32(-2.5));
        assert_eq!(packed[2], f16::from_f32(3.0));
        assert_eq!(packed[3], f16::from_f32(1.0));
    }

    #[test]
    fn test_pack_uv_clamps() {
        assert_eq!(pack_uv_unorm16(0.0, 1.0), [0, 65535]);
        assert_eq!(pack_uv_unorm16(-0.5, 2.0), [0, 65535]);
    }

    #[test]
    fn test_octahedral_roundtrip() {
        let dirs = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(0.577, 0.577, 0.577),
        ];

        for dir in dirs {
            let normalized = dir.normalize();
            let packed = pack_normal_octahedral(normalized.x, normalized.y, normalized.z);
            let decoded = unpack_octahedral_u32(packed);
            let error = (decoded - normalized).length();
            assert!(error < 0.01, "Roundtrip failed for {:?}", normalized);
        }
    }

    #[test]
    fn test_zero_normal_packs_to_origin() {
        assert_eq!(pack_normal_octahedral(0.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_vertex_stride_packed() {
        assert_eq!(vertex_stride_packed(0), 8);
        assert_eq!(vertex_stride_packed(FORMAT_UV), 12);
        assert_eq!(vertex_stride_packed(FORMAT_NORMAL), 12);
        assert_eq!(vertex_stride_packed(FORMAT_ALL), 16);
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(0), "POS");
        assert_eq!(format_name(FORMAT_ALL), "POS_UV_NORMAL");
    }

    #[test]
    fn test_pack_vertex_data_layout() {
        let object = MeshObject {
            name: "Tri".into(),
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            tex_coords: vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0]],
            normals: vec![[0.0, 0.0, -1.0]; 3],
            face_flags: vec![0],
        };

        let packed = pack_vertex_data(&object, FORMAT_ALL);
        assert_eq!(packed.len(), 3 * 16);

        // Second vertex: x = 1.0 as f16, then UV, then normal
        assert_eq!(&packed[16..18], &f16::from_f32(1.0).to_le_bytes());
        assert_eq!(&packed[24..28], &[0xFF, 0xFF, 0xFF, 0xFF]);
        let normal = u32::from_le_bytes([packed[28], packed[29], packed[30], packed[31]]);
        assert!((unpack_octahedral_u32(normal) - Vec3::NEG_Z).length() < 0.01);

        assert_eq!(pack_vertex_data(&object, 0).len(), 3 * 8);
        assert_eq!(pack_indices(&object.indices), vec![0, 0, 1, 0, 2, 0]);
    }
}
