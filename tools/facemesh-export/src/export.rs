//! Sequence export pipeline
//!
//! load frames -> compute morph targets -> plan animation -> assemble
//! document -> encode GLB -> write

use crate::animation::{AnimationMode, DEFAULT_FPS, plan_animation, validate_fps};
use crate::assemble::assemble_document;
use crate::error::ExportError;
use crate::mesh::MeshFrame;
use crate::morph::compute_morph_targets;
use crate::progress::ProgressSink;
use crate::sequence::{FrameRange, FrameSource, load_sequence, resolve_frames, stage_sequence};
use crate::texture::Textures;
use crate::writer::{encode_glb, write_glb};
use std::path::PathBuf;

/// Parameters of a single export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub source: FrameSource,
    pub output: PathBuf,
    /// Frames per second used for keyframe times
    pub fps: f32,
    pub range: FrameRange,
    pub mode: AnimationMode,
    /// Copy the selected frames and textures here after validation
    pub stage_dir: Option<PathBuf>,
}

impl ExportOptions {
    /// Sweep export of every frame at the default frame rate
    pub fn new(source: FrameSource, output: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output: output.into(),
            fps: DEFAULT_FPS,
            range: FrameRange::default(),
            mode: AnimationMode::default(),
            stage_dir: None,
        }
    }
}

/// What an export produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub frames: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub morph_targets: usize,
    /// 0 when no animation was written
    pub keyframes: usize,
    pub bytes: usize,
    /// Texture files that were expected but not embedded
    pub missing_textures: Vec<PathBuf>,
}

/// Export a frame sequence to a GLB file.
///
/// Progress is reported once per loaded frame, once after encoding and once
/// after writing, so `total = frames + 2`. Nothing is written unless every
/// step up to encoding succeeds, and frames are staged only after the GLB
/// is in place.
pub fn export_sequence(
    options: &ExportOptions,
    progress: &mut dyn ProgressSink,
) -> Result<ExportSummary, ExportError> {
    validate_fps(options.fps)?;

    let paths = resolve_frames(&options.source, options.range)?;
    let total = paths.len() + 2;
    tracing::info!("Exporting {} frames -> {:?}", paths.len(), options.output);

    let sequence = load_sequence(&paths, progress, total)?;
    let glb = encode_frames(&sequence.frames, &sequence.textures, &options.mode, options.fps)?;
    progress.update(paths.len() + 1, total);

    write_glb(&options.output, &glb.bytes)?;

    if let Some(dir) = &options.stage_dir {
        stage_sequence(&sequence, options.source.root(), dir)?;
    }
    progress.update(total, total);

    let base = sequence.base();
    let summary = ExportSummary {
        output: options.output.clone(),
        frames: sequence.frame_count(),
        vertices: base.vertex_count(),
        triangles: base.triangle_count(),
        morph_targets: sequence.frame_count() - 1,
        keyframes: glb.keyframes,
        bytes: glb.bytes.len(),
        missing_textures: sequence.textures.missing.clone(),
    };

    tracing::info!(
        "Exported {:?}: {} vertices, {} morph targets, {} keyframes, {} bytes",
        summary.output,
        summary.vertices,
        summary.morph_targets,
        summary.keyframes,
        summary.bytes
    );
    Ok(summary)
}

/// Encoded GLB plus the keyframe count it animates
#[derive(Debug, Clone)]
pub struct EncodedGlb {
    pub bytes: Vec<u8>,
    pub keyframes: usize,
}

/// Build GLB bytes from already-loaded frames. Pure: no file access.
pub fn encode_frames(
    frames: &[MeshFrame],
    textures: &Textures,
    mode: &AnimationMode,
    fps: f32,
) -> Result<EncodedGlb, ExportError> {
    let Some((base, rest)) = frames.split_first() else {
        return Err(ExportError::NoFrames {
            dir: PathBuf::from("<frame list>"),
        });
    };

    let targets = compute_morph_targets(base, rest);
    let plan = plan_animation(mode, targets.len(), fps)?;
    let document = assemble_document(base, &targets, textures, &plan)?;
    let bytes = encode_glb(&document)?;

    Ok(EncodedGlb {
        bytes,
        keyframes: document.keyframes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::parse_obj;
    use crate::progress::NoProgress;
    use std::path::Path;
    use tempfile::tempdir;

    fn tri(z: f32) -> String {
        format!("v 0 0 {z}\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n")
    }

    #[test]
    fn test_encode_frames_is_deterministic() {
        let frames: Vec<MeshFrame> = (0..3)
            .map(|i| parse_obj(Path::new("f.obj"), &tri(i as f32 * 0.1)).unwrap())
            .collect();

        let a = encode_frames(&frames, &Textures::default(), &AnimationMode::Sweep, 30.0).unwrap();
        let b = encode_frames(&frames, &Textures::default(), &AnimationMode::Sweep, 30.0).unwrap();
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.keyframes, 2);
    }

    #[test]
    fn test_export_reports_progress() {
        let dir = tempdir().expect("Failed to create temp dir");
        for i in 0..3 {
            std::fs::write(dir.path().join(format!("{:03}.obj", i)), tri(i as f32)).unwrap();
        }
        let output = dir.path().join("out").join("face.glb");
        let options = ExportOptions::new(FrameSource::Directory(dir.path().to_path_buf()), &output);

        let mut reported = Vec::new();
        let mut sink = |current: usize, total: usize| reported.push((current, total));
        let summary = export_sequence(&options, &mut sink).unwrap();

        assert_eq!(reported, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.morph_targets, 2);
        assert_eq!(summary.missing_textures.len(), 2);
        assert_eq!(std::fs::metadata(&output).unwrap().len() as usize, summary.bytes);
    }

    #[test]
    fn test_bad_fps_fails_before_loading() {
        let mut options = ExportOptions::new(
            FrameSource::Directory(PathBuf::from("/does/not/exist")),
            "out.glb",
        );
        options.fps = 0.0;
        assert!(matches!(
            export_sequence(&options, &mut NoProgress),
            Err(ExportError::InvalidFrameRate(_))
        ));
    }
}
