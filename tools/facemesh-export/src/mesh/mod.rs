//! Mesh frames loaded from OBJ files

mod normals;
mod obj;
mod types;

// Re-export public API
pub use normals::compute_smooth_normals;
pub use obj::{load_obj, parse_obj};
pub use types::{Corner, MAX_VERTEX_COUNT, MeshFrame};
