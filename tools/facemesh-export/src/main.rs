//! facemesh-export - morph-target GLB exporter
//!
//! Converts a directory of OBJ face-mesh frames into one animated .glb

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use facemesh_export::animation::{DEFAULT_FPS, DEFAULT_KEYFRAMES};
use facemesh_export::manifest::{self, DEFAULT_MANIFEST};
use facemesh_export::{AnimationMode, ExportOptions, FrameRange, FrameSource, export_sequence};

#[derive(Parser)]
#[command(name = "facemesh-export")]
#[command(about = "Export OBJ face-mesh sequences as morph-target GLB files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one frame sequence
    Export(ExportArgs),

    /// Export every sequence in a manifest file
    Build {
        /// Path to facemesh.toml manifest
        #[arg(default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without exporting
    Check {
        /// Path to facemesh.toml manifest
        #[arg(default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Directory of OBJ frames (searched recursively, sorted by path)
    #[arg(short, long, required_unless_present = "frames", conflicts_with = "frames")]
    input: Option<PathBuf>,

    /// Explicit OBJ frames, in order
    #[arg(long, num_args = 1..)]
    frames: Vec<PathBuf>,

    /// Output .glb file
    #[arg(short, long)]
    output: PathBuf,

    /// Frame rate for keyframe times
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: f32,

    /// First frame to export (inclusive)
    #[arg(long)]
    start: Option<usize>,

    /// Frame to stop at (exclusive)
    #[arg(long)]
    end: Option<usize>,

    /// Target weights (one per morph target) for a linear ramp, e.g. 0.5,0.8
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    weights: Option<Vec<f32>>,

    /// Number of keyframes in the weight ramp
    #[arg(long, default_value_t = DEFAULT_KEYFRAMES)]
    keyframes: usize,

    /// Export morph targets without animation
    #[arg(long = "static", conflicts_with = "weights")]
    static_pose: bool,

    /// Copy the selected frames and textures into this directory
    #[arg(long)]
    stage_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl ExportArgs {
    fn into_options(self) -> ExportOptions {
        let source = match self.input {
            Some(dir) => FrameSource::Directory(dir),
            None => FrameSource::Files(self.frames),
        };
        let mode = match (self.static_pose, self.weights) {
            (true, _) => AnimationMode::Static,
            (false, Some(weights)) => AnimationMode::TargetWeighted {
                weights,
                keyframes: self.keyframes,
            },
            (false, None) => AnimationMode::Sweep,
        };

        ExportOptions {
            source,
            output: self.output,
            fps: self.fps,
            range: FrameRange::new(self.start, self.end),
            mode,
            stage_dir: self.stage_dir,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export(args) => {
            init_logging(args.verbose);
            let options = args.into_options();
            let mut progress = |current: usize, total: usize| {
                tracing::debug!("Progress {}/{}", current, total);
            };
            let summary = export_sequence(&options, &mut progress)
                .with_context(|| format!("Failed to export {:?}", options.output))?;

            for missing in &summary.missing_textures {
                tracing::info!("No texture embedded for {:?}", missing);
            }
            tracing::info!("Done!");
        }

        Commands::Build {
            manifest,
            output_dir,
            verbose,
        } => {
            init_logging(verbose);
            tracing::info!("Building sequences from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let jobs = config.jobs(&manifest::manifest_dir(&manifest), output_dir.as_deref());

            let mut progress = |current: usize, total: usize| {
                tracing::info!("[{}/{}] sequence exported", current, total);
            };
            let summaries = manifest::build_all(&jobs, &mut progress)
                .with_context(|| format!("Build of {:?} failed", manifest))?;
            tracing::info!("Build complete! {} GLB files written", summaries.len());
        }

        Commands::Check { manifest } => {
            init_logging(false);
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            tracing::info!("Manifest is valid! {} sequences", config.sequence.len());
        }
    }

    Ok(())
}
