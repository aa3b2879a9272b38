//! Types and constants for mesh frames

use std::path::PathBuf;

/// Maximum index value for u16 indices (65535)
/// Frames with more vertices must be decimated before export.
pub(crate) const MAX_INDEX_VALUE: u32 = u16::MAX as u32;

/// Largest vertex count for u16 indices. Index 65535 is the primitive
/// restart value and may not appear in a glTF index buffer.
pub const MAX_VERTEX_COUNT: usize = MAX_INDEX_VALUE as usize;

/// One OBJ face corner, with 0-based resolved indices into the file's
/// `v`, `vt` and `vn` records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Corner {
    pub position: u32,
    pub uv: Option<u32>,
    pub normal: Option<u32>,
}

/// A single loaded frame of a mesh sequence
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFrame {
    /// File the frame was loaded from
    pub source: PathBuf,
    pub positions: Vec<[f32; 3]>,
    /// Same length as `positions`
    pub normals: Vec<[f32; 3]>,
    /// Same length as `positions`, V already flipped
    pub uvs: Vec<[f32; 2]>,
    /// Triangles indexing into the vertex arrays
    pub faces: Vec<[u32; 3]>,
    /// Raw face-corner records in file order (all polygon corners, before
    /// triangulation). Compared between frames to detect topology changes.
    pub corners: Vec<Corner>,
}

impl MeshFrame {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Flattened triangle indices as u16.
    ///
    /// Callers check the vertex count against [`MAX_VERTEX_COUNT`] first.
    pub fn indices_u16(&self) -> Vec<u16> {
        self.faces
            .iter()
            .flat_map(|f| f.iter().map(|&i| i as u16))
            .collect()
    }
}
