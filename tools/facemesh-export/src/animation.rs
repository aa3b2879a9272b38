//! Morph weight keyframe generation
//!
//! One export path serves every animation style; [`AnimationMode`] selects
//! how keyframes are generated (or whether there are any at all).

use crate::error::ExportError;
use morph_glb::Interpolation;

/// Default frame rate in frames per second
pub const DEFAULT_FPS: f32 = 30.0;

/// Default keyframe count for target-weighted ramps
pub const DEFAULT_KEYFRAMES: usize = 30;

/// How morph weights are animated
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnimationMode {
    /// No animation; targets are exported with zero weights
    Static,
    /// Show each frame in turn: one keyframe per target, one-hot weights, STEP
    #[default]
    Sweep,
    /// Ramp linearly from all-zero to `weights` over `keyframes` samples
    TargetWeighted { weights: Vec<f32>, keyframes: usize },
}

/// Sampled weights animation
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    /// Ascending sample times in seconds
    pub times: Vec<f32>,
    /// `times.len() * target_count` values, keyframe-major
    pub weights: Vec<f32>,
    pub interpolation: Interpolation,
}

impl Keyframes {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// What the document gets for a given mode and target count
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationPlan {
    /// No animation block; optional weights baked into the mesh
    Static { mesh_weights: Option<Vec<f32>> },
    Animated(Keyframes),
}

impl AnimationPlan {
    /// Default mesh weights, `None` meaning zeros for every target
    pub fn mesh_weights(&self) -> Option<Vec<f32>> {
        match self {
            AnimationPlan::Static { mesh_weights } => mesh_weights.clone(),
            AnimationPlan::Animated(_) => None,
        }
    }

    pub fn keyframes(&self) -> Option<&Keyframes> {
        match self {
            AnimationPlan::Static { .. } => None,
            AnimationPlan::Animated(k) => Some(k),
        }
    }
}

/// Check a frame rate is usable for keyframe times
pub fn validate_fps(fps: f32) -> Result<(), ExportError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(())
    } else {
        Err(ExportError::InvalidFrameRate(fps))
    }
}

/// Decide the animation for `target_count` morph targets.
///
/// All validation happens here, before anything is packed.
pub fn plan_animation(
    mode: &AnimationMode,
    target_count: usize,
    fps: f32,
) -> Result<AnimationPlan, ExportError> {
    validate_fps(fps)?;

    match mode {
        AnimationMode::TargetWeighted { weights, keyframes } => {
            if weights.len() != target_count {
                return Err(ExportError::WeightCountMismatch {
                    expected: target_count,
                    actual: weights.len(),
                });
            }
            match *keyframes {
                0 => Err(ExportError::InvalidKeyframeCount),
                _ if target_count == 0 => Ok(AnimationPlan::Static { mesh_weights: None }),
                1 => Ok(AnimationPlan::Static {
                    mesh_weights: Some(weights.clone()),
                }),
                n => Ok(AnimationPlan::Animated(weighted_keyframes(weights, n, fps))),
            }
        }
        AnimationMode::Sweep if target_count > 0 => {
            Ok(AnimationPlan::Animated(sweep_keyframes(target_count, fps)))
        }
        AnimationMode::Sweep | AnimationMode::Static => {
            Ok(AnimationPlan::Static { mesh_weights: None })
        }
    }
}

/// One keyframe per target at `(i + 1) / fps`, activating target `i` only
pub fn sweep_keyframes(target_count: usize, fps: f32) -> Keyframes {
    let times = (0..target_count).map(|i| (i + 1) as f32 / fps).collect();

    let mut weights = vec![0.0; target_count * target_count];
    for i in 0..target_count {
        weights[i * target_count + i] = 1.0;
    }

    Keyframes {
        times,
        weights,
        interpolation: Interpolation::Step,
    }
}

/// `keyframes` samples at `t / fps` with weight `weights[k] * t / (keyframes - 1)`.
///
/// Requires `keyframes >= 2`.
pub fn weighted_keyframes(weights: &[f32], keyframes: usize, fps: f32) -> Keyframes {
    let last = (keyframes - 1) as f32;
    let times = (0..keyframes).map(|t| t as f32 / fps).collect();

    let mut out = Vec::with_capacity(keyframes * weights.len());
    for t in 0..keyframes {
        let ramp = t as f32 / last;
        out.extend(weights.iter().map(|w| w * ramp));
    }

    Keyframes {
        times,
        weights: out,
        interpolation: Interpolation::Linear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_sweep_three_targets() {
        let k = sweep_keyframes(3, 30.0);
        assert_close(&k.times, &[1.0 / 30.0, 2.0 / 30.0, 3.0 / 30.0]);
        assert_eq!(
            k.weights,
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(k.interpolation, Interpolation::Step);
    }

    #[test]
    fn test_weighted_ramp() {
        let k = weighted_keyframes(&[0.5, 0.8], 5, 30.0);
        assert_eq!(k.len(), 5);
        assert_close(&k.times, &[0.0, 1.0 / 30.0, 2.0 / 30.0, 3.0 / 30.0, 4.0 / 30.0]);
        assert_close(&k.weights[0..2], &[0.0, 0.0]);
        assert_close(&k.weights[4..6], &[0.25, 0.4]);
        assert_close(&k.weights[8..10], &[0.5, 0.8]);
        assert_eq!(k.interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_plan_weight_mismatch() {
        let mode = AnimationMode::TargetWeighted {
            weights: vec![0.5, 0.8],
            keyframes: 5,
        };
        assert!(matches!(
            plan_animation(&mode, 3, 30.0),
            Err(ExportError::WeightCountMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_plan_single_keyframe_bakes_weights() {
        let mode = AnimationMode::TargetWeighted {
            weights: vec![0.5, 0.8],
            keyframes: 1,
        };
        let plan = plan_animation(&mode, 2, 30.0).unwrap();
        assert_eq!(plan.mesh_weights(), Some(vec![0.5, 0.8]));
        assert!(plan.keyframes().is_none());
    }

    #[test]
    fn test_plan_zero_keyframes_rejected() {
        let mode = AnimationMode::TargetWeighted {
            weights: vec![1.0],
            keyframes: 0,
        };
        assert!(matches!(
            plan_animation(&mode, 1, 30.0),
            Err(ExportError::InvalidKeyframeCount)
        ));
    }

    #[test]
    fn test_plan_static_cases() {
        assert_eq!(
            plan_animation(&AnimationMode::Sweep, 0, 30.0).unwrap(),
            AnimationPlan::Static { mesh_weights: None }
        );
        assert_eq!(
            plan_animation(&AnimationMode::Static, 4, 30.0).unwrap(),
            AnimationPlan::Static { mesh_weights: None }
        );
        let plan = plan_animation(&AnimationMode::Sweep, 2, 24.0).unwrap();
        assert_eq!(plan.keyframes().map(|k| k.len()), Some(2));
    }

    #[test]
    fn test_bad_frame_rates() {
        for fps in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                plan_animation(&AnimationMode::Sweep, 1, fps),
                Err(ExportError::InvalidFrameRate(_))
            ));
        }
    }
}
