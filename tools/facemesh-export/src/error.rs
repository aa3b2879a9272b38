//! Export error types

use morph_glb::GlbError;
use std::path::PathBuf;

/// Errors that abort a sequence export.
///
/// A missing texture is not an error: it is logged and listed in
/// [`crate::ExportSummary::missing_textures`].
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Frame {frame_index} ({path:?}) does not match the base topology: {reason}")]
    TopologyMismatch {
        frame_index: usize,
        path: PathBuf,
        reason: String,
    },

    #[error("{attribute} has {actual} entries, expected {expected}")]
    AttributeCountMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Got {actual} target weights for {expected} morph targets")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("Face index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error(
        "Mesh {path:?} has {vertices} vertices, exceeds maximum {max} for u16 indices. \
        Decimate the mesh or split it before export."
    )]
    IndexOverflow {
        path: PathBuf,
        vertices: usize,
        max: usize,
    },

    #[error("Document cannot be serialized: {0}")]
    SerializationFailure(#[source] GlbError),

    #[error("Buffer packing failed: {0}")]
    Packing(#[source] GlbError),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path:?}:{line}: {message}")]
    ObjParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("No OBJ frames found in {dir:?}")]
    NoFrames { dir: PathBuf },

    #[error("Staging {first:?} and {second:?} would both write {dest:?}")]
    StagingConflict {
        dest: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Frame range {start}..{end} is invalid for {available} frames")]
    InvalidFrameRange {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("Frame rate must be a finite number above zero, got {0}")]
    InvalidFrameRate(f32),

    #[error("Target-weighted animation needs at least one keyframe")]
    InvalidKeyframeCount,

    #[error("Manifest {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },
}

impl ExportError {
    /// Wrap an I/O error with the path it happened at
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}
