//! Morph target (position delta) computation

use crate::mesh::MeshFrame;
use morph_glb::Bounds;

/// Per-vertex position offsets of one frame relative to the base
#[derive(Debug, Clone, PartialEq)]
pub struct MorphTarget {
    pub deltas: Vec<[f32; 3]>,
    /// Component-wise minimum delta
    pub min: [f32; 3],
    /// Component-wise maximum delta
    pub max: [f32; 3],
}

impl MorphTarget {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_arrays(self.min, self.max)
    }
}

/// `delta[v] = frame.positions[v] - base.positions[v]`.
///
/// Frames are expected to share the base topology; extra vertices on either
/// side are ignored.
pub fn compute_morph_target(base: &MeshFrame, frame: &MeshFrame) -> MorphTarget {
    let deltas: Vec<[f32; 3]> = frame
        .positions
        .iter()
        .zip(&base.positions)
        .map(|(p, b)| [p[0] - b[0], p[1] - b[1], p[2] - b[2]])
        .collect();

    let bounds = Bounds::of_vec3(&deltas);
    MorphTarget {
        min: [bounds.min[0], bounds.min[1], bounds.min[2]],
        max: [bounds.max[0], bounds.max[1], bounds.max[2]],
        deltas,
    }
}

/// One morph target per frame after the base, in frame order
pub fn compute_morph_targets(base: &MeshFrame, rest: &[MeshFrame]) -> Vec<MorphTarget> {
    rest.iter()
        .map(|frame| compute_morph_target(base, frame))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn frame(positions: Vec<[f32; 3]>) -> MeshFrame {
        let n = positions.len();
        MeshFrame {
            source: PathBuf::from("f.obj"),
            positions,
            normals: vec![[0.0, 0.0, 1.0]; n],
            uvs: vec![[0.0, 0.0]; n],
            faces: vec![[0, 1, 2]],
            corners: Vec::new(),
        }
    }

    #[test]
    fn test_deltas_and_bounds() {
        let base = frame(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let moved = frame(vec![[0.0, 0.5, 0.0], [1.0, 0.0, -0.25], [0.0, 1.0, 0.0]]);

        let target = compute_morph_target(&base, &moved);
        assert_eq!(
            target.deltas,
            vec![[0.0, 0.5, 0.0], [0.0, 0.0, -0.25], [0.0, 0.0, 0.0]]
        );
        assert_eq!(target.min, [0.0, 0.0, -0.25]);
        assert_eq!(target.max, [0.0, 0.5, 0.0]);
        assert_eq!(target.bounds().max, vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_one_target_per_remaining_frame() {
        let base = frame(vec![[0.0; 3]; 3]);
        let rest: Vec<MeshFrame> = (1..4).map(|i| frame(vec![[i as f32; 3]; 3])).collect();

        let targets = compute_morph_targets(&base, &rest);
        assert_eq!(targets.len(), 3);
        for (i, target) in targets.iter().enumerate() {
            assert_eq!(target.deltas.len(), base.vertex_count());
            assert_eq!(target.min, [(i + 1) as f32; 3]);
        }
    }

    #[test]
    fn test_identical_frame_has_zero_deltas() {
        let base = frame(vec![[0.3, 0.2, 0.1]; 3]);
        let target = compute_morph_target(&base, &base.clone());
        assert!(target.deltas.iter().all(|d| *d == [0.0; 3]));
        assert_eq!(target.min, [0.0; 3]);
        assert_eq!(target.max, [0.0; 3]);
    }
}
