//! Smooth vertex normals for frames without `vn` records

/// Fallback for vertices whose adjacent faces are all degenerate
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Area-weighted smooth normals.
///
/// Each face contributes its unnormalized cross product (twice its area) to
/// its three vertices. Out-of-range indices are ignored.
pub fn compute_smooth_normals(positions: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut accum = vec![[0.0f32; 3]; positions.len()];

    for face in faces {
        let [a, b, c] = face.map(|i| i as usize);
        let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };

        let n = cross(sub(*pb, *pa), sub(*pc, *pa));
        for v in [a, b, c] {
            for k in 0..3 {
                accum[v][k] += n[k];
            }
        }
    }

    accum.into_iter().map(normalize_or_fallback).collect()
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Unit-length copy of `v`, or [`FALLBACK_NORMAL`] for zero or non-finite input
pub(super) fn normalize_or_fallback(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > f32::EPSILON && len.is_finite() {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        FALLBACK_NORMAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_quad_faces_up() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let normals = compute_smooth_normals(&positions, &[[0, 1, 2], [0, 2, 3]]);
        for n in normals {
            assert!((n[2] - 1.0).abs() < 1e-6);
            assert!(n[0].abs() < 1e-6 && n[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_larger_face_dominates() {
        // Shared edge 0-1; the big face lies in XY, the small one in XZ
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, -0.1],
        ];
        let normals = compute_smooth_normals(&positions, &[[0, 1, 2], [0, 3, 1]]);
        let n = normals[0];
        assert!(n[2] > 0.99, "normal {:?} should lean towards +Z", n);
    }

    #[test]
    fn test_isolated_and_degenerate_vertices_fall_back() {
        let positions = [[0.0; 3], [0.0; 3], [0.0; 3], [5.0, 5.0, 5.0]];
        let normals = compute_smooth_normals(&positions, &[[0, 1, 2]]);
        assert_eq!(normals, vec![FALLBACK_NORMAL; 4]);
    }
}
