//! tds-export library
//!
//! Conversion functions behind the `tds-export` binary, usable from other
//! tools that want packed meshes without going through files.

pub mod formats;
pub mod manifest;
pub mod mesh;

// Re-export packing constants and the loader configuration from tds-common
pub use tds_common::{FORMAT_ALL, FORMAT_NORMAL, FORMAT_UV, LoadOptions, vertex_stride_packed};

pub use mesh::{
    ConvertedMesh, FormatError, convert_3ds, convert_3ds_to_memory, convert_3ds_with_options,
    parse_format_string,
};
