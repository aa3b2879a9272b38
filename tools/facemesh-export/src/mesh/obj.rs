//! OBJ frame parsing

use super::normals::{compute_smooth_normals, normalize_or_fallback};
use super::types::{Corner, MAX_VERTEX_COUNT, MeshFrame};
use crate::error::ExportError;
use hashbrown::HashMap;
use std::path::Path;

/// Load and parse a single OBJ frame
pub fn load_obj(path: &Path) -> Result<MeshFrame, ExportError> {
    let text = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
    parse_obj(path, &text)
}

/// Parse OBJ text into a frame.
///
/// Supports `v`, `vt`, `vn` and `f` records (other records are ignored).
/// Polygons are fan-triangulated. When every corner uses the same index for
/// its position, UV and normal, vertices map 1:1 onto `v` records; otherwise
/// each distinct corner becomes its own vertex.
pub fn parse_obj(source: &Path, text: &str) -> Result<MeshFrame, ExportError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals_raw: Vec<[f32; 3]> = Vec::new();

    let mut corners: Vec<Corner> = Vec::new();
    // Corner range of each polygon
    let mut polygons: Vec<std::ops::Range<usize>> = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_error = |message: String| ExportError::ObjParse {
            path: source.to_path_buf(),
            line: line_idx + 1,
            message,
        };

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => positions.push(parse_floats::<3>(keyword, &mut parts).map_err(parse_error)?),
            "vt" => tex_coords.push(parse_floats::<2>(keyword, &mut parts).map_err(parse_error)?),
            "vn" => normals_raw.push(parse_floats::<3>(keyword, &mut parts).map_err(parse_error)?),
            "f" => {
                let start = corners.len();
                let counts = (positions.len(), tex_coords.len(), normals_raw.len());
                for token in parts {
                    corners.push(parse_corner(token, counts).map_err(parse_error)?);
                }
                if corners.len() - start < 3 {
                    return Err(parse_error(format!(
                        "face has {} corners, need at least 3",
                        corners.len() - start
                    )));
                }
                polygons.push(start..corners.len());
            }
            _ => {}
        }
    }

    let whole_file_error = |message: &str| ExportError::ObjParse {
        path: source.to_path_buf(),
        line: 0,
        message: message.to_string(),
    };
    if positions.is_empty() {
        return Err(whole_file_error("no vertex records"));
    }
    if polygons.is_empty() {
        return Err(whole_file_error("no face records"));
    }

    let shared_indices = corners.iter().all(|c| {
        c.uv.is_none_or(|t| t == c.position) && c.normal.is_none_or(|n| n == c.position)
    });

    let (vertex_positions, mut uvs, normals, corner_vertices) = if shared_indices {
        let uvs: Vec<[f32; 2]> = (0..positions.len())
            .map(|i| tex_coords.get(i).copied().unwrap_or([0.0, 0.0]))
            .collect();
        let normals = (normals_raw.len() >= positions.len())
            .then(|| normals_raw[..positions.len()].to_vec());
        let corner_vertices: Vec<u32> = corners.iter().map(|c| c.position).collect();
        (positions, uvs, normals, corner_vertices)
    } else {
        split_corners(&positions, &tex_coords, &normals_raw, &corners)
    };

    if vertex_positions.len() > MAX_VERTEX_COUNT {
        return Err(ExportError::IndexOverflow {
            path: source.to_path_buf(),
            vertices: vertex_positions.len(),
            max: MAX_VERTEX_COUNT,
        });
    }

    // Triangulate (fan triangulation for convex polygons)
    let mut faces: Vec<[u32; 3]> = Vec::new();
    for polygon in &polygons {
        let ids = &corner_vertices[polygon.clone()];
        for i in 1..ids.len() - 1 {
            faces.push([ids[0], ids[i], ids[i + 1]]);
        }
    }

    if tex_coords.is_empty() {
        tracing::warn!("{:?} has no texture coordinates, using zero UVs", source);
    }
    // Flip V to the glTF convention
    for uv in &mut uvs {
        uv[1] = 1.0 - uv[1];
    }

    let normals = match normals {
        Some(n) => n.into_iter().map(normalize_or_fallback).collect(),
        None => {
            tracing::debug!("{:?} has incomplete normals, computing smooth normals", source);
            compute_smooth_normals(&vertex_positions, &faces)
        }
    };

    tracing::debug!(
        "Parsed OBJ {:?}: {} vertices, {} triangles",
        source,
        vertex_positions.len(),
        faces.len()
    );

    Ok(MeshFrame {
        source: source.to_path_buf(),
        positions: vertex_positions,
        normals,
        uvs,
        faces,
        corners,
    })
}

type SplitVertices = (
    Vec<[f32; 3]>,
    Vec<[f32; 2]>,
    Option<Vec<[f32; 3]>>,
    Vec<u32>,
);

/// One vertex per distinct corner, in first-appearance order
fn split_corners(
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals_raw: &[[f32; 3]],
    corners: &[Corner],
) -> SplitVertices {
    let mut lookup: HashMap<Corner, u32> = HashMap::new();
    let mut out_positions = Vec::new();
    let mut out_uvs = Vec::new();
    let mut out_normals = Vec::new();
    let mut all_normals = true;
    let mut corner_vertices = Vec::with_capacity(corners.len());

    for corner in corners {
        let id = *lookup.entry(*corner).or_insert_with(|| {
            out_positions.push(positions[corner.position as usize]);
            out_uvs.push(
                corner
                    .uv
                    .map(|t| tex_coords[t as usize])
                    .unwrap_or([0.0, 0.0]),
            );
            match corner.normal {
                Some(n) => out_normals.push(normals_raw[n as usize]),
                None => all_normals = false,
            }
            (out_positions.len() - 1) as u32
        });
        corner_vertices.push(id);
    }

    let normals = all_normals.then_some(out_normals);
    (out_positions, out_uvs, normals, corner_vertices)
}

fn parse_floats<const N: usize>(
    keyword: &str,
    parts: &mut std::str::SplitWhitespace<'_>,
) -> Result<[f32; N], String> {
    let mut out = [0.0f32; N];
    for value in out.iter_mut() {
        let token = parts
            .next()
            .ok_or_else(|| format!("'{}' record needs {} components", keyword, N))?;
        *value = token
            .parse()
            .map_err(|_| format!("invalid number '{}' in '{}' record", token, keyword))?;
    }
    Ok(out)
}

/// Parse OBJ corner reference: "v", "v/vt", "v/vt/vn", or "v//vn"
///
/// `counts` are the numbers of `v`, `vt` and `vn` records seen so far, used to
/// resolve negative (relative) indices and reject dangling ones.
fn parse_corner(token: &str, counts: (usize, usize, usize)) -> Result<Corner, String> {
    let mut fields = token.split('/');

    let position = match fields.next() {
        Some(s) if !s.is_empty() => resolve_index(s, counts.0, "vertex")?,
        _ => return Err(format!("face corner '{}' has no vertex index", token)),
    };
    let uv = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, counts.1, "texture coordinate")?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, counts.2, "normal")?),
        _ => None,
    };

    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Resolve a 1-based or negative OBJ index to a 0-based one
fn resolve_index(s: &str, count: usize, kind: &str) -> Result<u32, String> {
    let raw: i64 = s
        .parse()
        .map_err(|_| format!("invalid {} index '{}'", kind, s))?;

    let resolved = match raw {
        0 => return Err(format!("{} index 0 is not valid (OBJ indices start at 1)", kind)),
        r if r > 0 => r - 1,
        r => count as i64 + r,
    };

    if resolved < 0 || resolved as usize >= count {
        return Err(format!(
            "{} index {} out of range ({} defined so far)",
            kind, raw, count
        ));
    }
    Ok(resolved as u32)
}
