//! Mesh sequence discovery, loading and topology validation

use crate::error::ExportError;
use crate::mesh::{MeshFrame, load_obj};
use crate::progress::ProgressSink;
use crate::texture::Textures;
use hashbrown::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of reconstruction detail meshes, which are not animation frames
const DETAIL_SUFFIX: &str = "_detail.obj";

/// Where frames come from
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    /// Every `*.obj` below a directory, sorted by path
    Directory(PathBuf),
    /// Explicit list, kept in caller order
    Files(Vec<PathBuf>),
}

impl FrameSource {
    /// Directory that staged copies are laid out relative to
    pub fn root(&self) -> Option<&Path> {
        match self {
            FrameSource::Directory(dir) => Some(dir.as_path()),
            FrameSource::Files(_) => None,
        }
    }
}

/// Frame subrange: `start` inclusive, `end` exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl FrameRange {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Select the range from `items`. `end` is clamped to the number of items;
    /// an empty selection is an error.
    pub fn select<T>(&self, mut items: Vec<T>) -> Result<Vec<T>, ExportError> {
        let available = items.len();
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(available).min(available);

        if start >= end {
            return Err(ExportError::InvalidFrameRange {
                start,
                end: self.end.unwrap_or(available),
                available,
            });
        }

        items.truncate(end);
        items.drain(..start);
        Ok(items)
    }
}

/// Recursively collect OBJ frames below `dir`, skipping detail meshes
pub fn discover_frames(dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let mut frames = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| ExportError::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_obj = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
        let is_detail = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().ends_with(DETAIL_SUFFIX))
            .unwrap_or(false);

        if is_obj && !is_detail {
            frames.push(path.to_path_buf());
        }
    }

    frames.sort();
    tracing::debug!("Discovered {} frames in {:?}", frames.len(), dir);
    Ok(frames)
}

/// Resolve a frame source and range to the ordered list of frame files
pub fn resolve_frames(source: &FrameSource, range: FrameRange) -> Result<Vec<PathBuf>, ExportError> {
    let (frames, origin) = match source {
        FrameSource::Directory(dir) => (discover_frames(dir)?, dir.clone()),
        FrameSource::Files(files) => (files.clone(), PathBuf::from("<frame list>")),
    };

    if frames.is_empty() {
        return Err(ExportError::NoFrames { dir: origin });
    }
    range.select(frames)
}

/// Loaded, topology-checked frames plus the base frame's textures
#[derive(Debug, Clone)]
pub struct MeshSequence {
    /// Base frame first
    pub frames: Vec<MeshFrame>,
    pub textures: Textures,
}

impl MeshSequence {
    pub fn base(&self) -> &MeshFrame {
        &self.frames[0]
    }

    /// Every frame after the base
    pub fn rest(&self) -> &[MeshFrame] {
        &self.frames[1..]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// A single-frame sequence has no morph targets
    pub fn is_static(&self) -> bool {
        self.frames.len() < 2
    }
}

/// Load every frame, validating each against the first.
///
/// Reports `(i + 1, total)` to `progress` after frame `i` is loaded.
pub fn load_sequence(
    paths: &[PathBuf],
    progress: &mut dyn ProgressSink,
    total: usize,
) -> Result<MeshSequence, ExportError> {
    let mut frames: Vec<MeshFrame> = Vec::with_capacity(paths.len());

    for (i, path) in paths.iter().enumerate() {
        let frame = load_obj(path)?;
        if let Some(base) = frames.first() {
            check_topology(base, &frame, i)?;
        }
        tracing::debug!("Loaded frame {} {:?}", i, path);
        frames.push(frame);
        progress.update(i + 1, total);
    }

    let Some(base) = frames.first() else {
        return Err(ExportError::NoFrames {
            dir: PathBuf::from("<frame list>"),
        });
    };
    let textures = Textures::for_frame(&base.source);

    Ok(MeshSequence { frames, textures })
}

/// Verify `frame` shares the base frame's vertex count and face records
pub fn check_topology(
    base: &MeshFrame,
    frame: &MeshFrame,
    frame_index: usize,
) -> Result<(), ExportError> {
    let mismatch = |reason: String| ExportError::TopologyMismatch {
        frame_index,
        path: frame.source.clone(),
        reason,
    };

    if frame.vertex_count() != base.vertex_count() {
        return Err(mismatch(format!(
            "vertex count {} differs from base {}",
            frame.vertex_count(),
            base.vertex_count()
        )));
    }

    if frame.corners.len() != base.corners.len() {
        return Err(mismatch(format!(
            "{} face corners, base has {}",
            frame.corners.len(),
            base.corners.len()
        )));
    }

    if let Some(i) = frame
        .corners
        .iter()
        .zip(&base.corners)
        .position(|(a, b)| a != b)
    {
        return Err(mismatch(format!("face corner {} differs from base", i)));
    }

    if frame.faces != base.faces {
        return Err(mismatch("triangle indices differ from base".to_string()));
    }

    Ok(())
}

/// Copy the selected frames and found textures into `dir`.
///
/// Files below `root` keep their relative path; anything else is staged by
/// file name. Every destination is resolved before the first copy, and two
/// sources mapping to the same destination fail with `StagingConflict`.
pub fn stage_sequence(
    sequence: &MeshSequence,
    root: Option<&Path>,
    dir: &Path,
) -> Result<(), ExportError> {
    let textures = sequence.textures.iter().map(|(_, t)| t.path.as_path());
    let frames = sequence.frames.iter().map(|f| f.source.as_path());

    let mut planned: Vec<(&Path, PathBuf)> = Vec::new();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    for src in frames.chain(textures) {
        let Some(relative) = staged_path(src, root) else {
            continue;
        };
        let dst = dir.join(relative);
        if let Some(first) = claimed.insert(dst.clone(), src) {
            return Err(ExportError::StagingConflict {
                dest: dst,
                first: first.to_path_buf(),
                second: src.to_path_buf(),
            });
        }
        planned.push((src, dst));
    }

    for (src, dst) in &planned {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        std::fs::copy(src, dst).map_err(|e| ExportError::io(dst, e))?;
    }

    tracing::info!("Staged {} files into {:?}", planned.len(), dir);
    Ok(())
}

fn staged_path(src: &Path, root: Option<&Path>) -> Option<PathBuf> {
    if let Some(relative) = root.and_then(|r| src.strip_prefix(r).ok()) {
        if relative.file_name().is_some() {
            return Some(relative.to_path_buf());
        }
    }
    src.file_name().map(PathBuf::from)
}
