//! GLB packing utilities for morph-target mesh sequences
//!
//! This library provides the low-level pieces used by `facemesh-export`:
//! - BufferPacker: append-only binary buffer with 4-byte aligned views
//! - AccessorTable: typed accessors over packed views, with bounds
//! - GltfBuilder: document construction (mesh, morph targets, material, weights animation)
//! - assemble_glb: fail-fast value scan plus GLB container serialization
//!
//! # Example
//!
//! ```no_run
//! use morph_glb::*;
//!
//! let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]];
//! let mut packer = BufferPacker::new();
//! let mut accessors = AccessorTable::new();
//!
//! let view = packer.append_vec3(&positions, Some(Usage::VertexAttribute));
//! let pos = accessors
//!     .push(&packer, view, ComponentType::F32, Shape::Vec3, 3, Some(Bounds::of_vec3(&positions)))
//!     .unwrap();
//! let view = packer.append_indices_u16(&[0, 1, 2]);
//! let idx = accessors
//!     .push(&packer, view, ComponentType::U16, Shape::Scalar, 3, Some(Bounds::of_indices(&[0, 1, 2])))
//!     .unwrap();
//!
//! let root = GltfBuilder::new()
//!     .add_material("Default", None, None)
//!     .add_morph_mesh("Triangle", &MorphMeshAccessors::new(pos, pos, pos, idx), Some(0), None)
//!     .add_mesh_node("Triangle", 0, None)
//!     .add_scene("Scene", &[0])
//!     .build(&packer, accessors, "morph-glb");
//! let glb_bytes = assemble_glb(&root, packer.data()).unwrap();
//! ```

pub mod accessor;
pub mod buffer;
pub mod document;
pub mod glb;

pub use accessor::{AccessorIndex, AccessorTable, Bounds, ComponentType, Shape};
pub use buffer::{BufferPacker, Usage, View, ViewIndex, align_buffer};
pub use document::{GltfBuilder, Interpolation, MorphMeshAccessors};
pub use glb::{GlbError, assemble_glb, scan_json_values};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
