//! Packed binary mesh format
//!
//! POD layout with no magic bytes; a reader knows what it is loading from
//! the file extension.

pub mod mesh;

pub use mesh::*;
