//! facemesh-export library
//!
//! Turns a sequence of OBJ frames sharing one topology into a single GLB:
//! the first frame is the base mesh, every later frame becomes a morph
//! target, and an optional animation drives the morph weights.

pub mod animation;
pub mod assemble;
pub mod error;
pub mod export;
pub mod manifest;
pub mod mesh;
pub mod morph;
pub mod progress;
pub mod sequence;
pub mod texture;
pub mod writer;

pub use animation::{AnimationMode, AnimationPlan, Keyframes, plan_animation};
pub use error::ExportError;
pub use export::{EncodedGlb, ExportOptions, ExportSummary, encode_frames, export_sequence};
pub use mesh::{MeshFrame, load_obj};
pub use morph::{MorphTarget, compute_morph_target, compute_morph_targets};
pub use progress::{NoProgress, ProgressSink};
pub use sequence::{FrameRange, FrameSource, MeshSequence, load_sequence};
pub use texture::{TextureAsset, Textures};
