//! facemesh.toml batch manifest
//!
//! ```toml
//! [output]
//! dir = "out"
//!
//! [defaults]
//! fps = 30.0
//! keyframes = 30
//!
//! [[sequence]]
//! input = "frames/take1"
//! output = "take1.glb"
//! weights = [0.5, 0.8]
//! ```

use crate::animation::{AnimationMode, DEFAULT_FPS, DEFAULT_KEYFRAMES};
use crate::error::ExportError;
use crate::export::{ExportOptions, ExportSummary, export_sequence};
use crate::progress::{NoProgress, ProgressSink};
use crate::sequence::{FrameRange, FrameSource};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "facemesh.toml";

/// facemesh.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub sequence: Vec<SequenceEntry>,
}

/// Output configuration section
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Base directory for relative sequence outputs
    pub dir: Option<PathBuf>,
}

/// Values used by sequences that don't set their own
#[derive(Debug, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_keyframes")]
    pub keyframes: usize,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            keyframes: default_keyframes(),
        }
    }
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

fn default_keyframes() -> usize {
    DEFAULT_KEYFRAMES
}

/// Single `[[sequence]]` export job
#[derive(Debug, Deserialize)]
pub struct SequenceEntry {
    /// Directory of OBJ frames
    pub input: PathBuf,
    /// GLB file to write
    pub output: PathBuf,
    pub fps: Option<f32>,
    pub start: Option<usize>,
    pub end: Option<usize>,

    /// Target weights, one per morph target. Selects the linear ramp
    /// animation instead of the frame sweep.
    pub weights: Option<Vec<f32>>,
    /// Keyframe count for the weight ramp
    pub keyframes: Option<usize>,

    /// Export morph targets without animation
    #[serde(default, rename = "static")]
    pub static_pose: bool,

    pub stage_dir: Option<PathBuf>,
}

impl Manifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse manifest from string; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, ExportError> {
        toml::from_str(content).map_err(|e| ExportError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check every sequence is exportable as configured
    pub fn validate(&self, path: &Path) -> Result<(), ExportError> {
        let invalid = |message: String| ExportError::Manifest {
            path: path.to_path_buf(),
            message,
        };

        if self.sequence.is_empty() {
            return Err(invalid("no [[sequence]] entries".to_string()));
        }
        if !valid_fps(self.defaults.fps) {
            return Err(invalid(format!("defaults.fps {} must be above zero", self.defaults.fps)));
        }
        if self.defaults.keyframes == 0 {
            return Err(invalid("defaults.keyframes must be at least 1".to_string()));
        }

        let mut outputs = HashSet::new();
        for (i, entry) in self.sequence.iter().enumerate() {
            let label = format!("sequence[{}]", i);

            if entry.input.as_os_str().is_empty() {
                return Err(invalid(format!("{}: input is empty", label)));
            }
            if entry.output.as_os_str().is_empty() {
                return Err(invalid(format!("{}: output is empty", label)));
            }
            if let Some(fps) = entry.fps {
                if !valid_fps(fps) {
                    return Err(invalid(format!("{}: fps {} must be above zero", label, fps)));
                }
            }
            if let (Some(start), Some(end)) = (entry.start, entry.end) {
                if start >= end {
                    return Err(invalid(format!(
                        "{}: start {} must be below end {}",
                        label, start, end
                    )));
                }
            }
            if entry.keyframes == Some(0) {
                return Err(invalid(format!("{}: keyframes must be at least 1", label)));
            }
            if entry.static_pose && entry.weights.is_some() {
                return Err(invalid(format!(
                    "{}: static and weights cannot be combined",
                    label
                )));
            }
            if !outputs.insert(normalize_path(&entry.output)) {
                return Err(invalid(format!(
                    "{}: output {:?} is used by an earlier sequence",
                    label, entry.output
                )));
            }
        }

        Ok(())
    }

    /// Resolve every sequence to export options.
    ///
    /// Relative inputs resolve against `base_dir` (the manifest's directory).
    /// Relative outputs resolve against `output_override`, else `[output].dir`,
    /// else `base_dir`.
    pub fn jobs(&self, base_dir: &Path, output_override: Option<&Path>) -> Vec<ExportOptions> {
        let output_dir = match (output_override, &self.output.dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => base_dir.join(dir),
            (None, None) => base_dir.to_path_buf(),
        };

        self.sequence
            .iter()
            .map(|entry| {
                let mode = if entry.static_pose {
                    AnimationMode::Static
                } else if let Some(weights) = &entry.weights {
                    AnimationMode::TargetWeighted {
                        weights: weights.clone(),
                        keyframes: entry.keyframes.unwrap_or(self.defaults.keyframes),
                    }
                } else {
                    AnimationMode::Sweep
                };

                ExportOptions {
                    source: FrameSource::Directory(base_dir.join(&entry.input)),
                    output: output_dir.join(&entry.output),
                    fps: entry.fps.unwrap_or(self.defaults.fps),
                    range: FrameRange::new(entry.start, entry.end),
                    mode,
                    stage_dir: entry.stage_dir.as_ref().map(|d| base_dir.join(d)),
                }
            })
            .collect()
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component, so `a.glb`, `./a.glb` and `x/../a.glb` compare equal
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn valid_fps(fps: f32) -> bool {
    fps.is_finite() && fps > 0.0
}

/// Load and validate a manifest
pub fn load_manifest(path: &Path) -> Result<Manifest, ExportError> {
    let manifest = Manifest::load(path)?;
    manifest.validate(path)?;
    Ok(manifest)
}

/// Directory relative manifest paths resolve against
pub fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run every job in order, stopping at the first failure.
///
/// Each job uses its own packer and document. Reports `(i + 1, jobs)` after
/// job `i` completes.
pub fn build_all(
    jobs: &[ExportOptions],
    progress: &mut dyn ProgressSink,
) -> Result<Vec<ExportSummary>, ExportError> {
    let mut summaries = Vec::with_capacity(jobs.len());
    for (i, job) in jobs.iter().enumerate() {
        let summary = export_sequence(job, &mut NoProgress)?;
        for missing in &summary.missing_textures {
            tracing::debug!("{:?}: no texture at {:?}", summary.output, missing);
        }
        summaries.push(summary);
        progress.update(i + 1, jobs.len());
    }
    Ok(summaries)
}
