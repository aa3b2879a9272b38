//! GLB container assembly.

use gltf_json as json;

/// GLB header magic ("glTF")
pub const GLB_MAGIC: &[u8; 4] = b"glTF";
/// GLB container version
pub const GLB_VERSION: u32 = 2;
/// Chunk type "JSON"
pub const CHUNK_JSON: u32 = 0x4E4F534A;
/// Chunk type "BIN\0"
pub const CHUNK_BIN: u32 = 0x004E4942;

/// Errors produced while packing or serializing a document
#[derive(Debug, thiserror::Error)]
pub enum GlbError {
    #[error("Value at {path} is not representable in JSON (NaN or infinite)")]
    NonFinite { path: String },

    #[error("Failed to serialize glTF JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GLB would be {length} bytes, exceeding the 4 GiB container limit")]
    TooLarge { length: usize },

    #[error("Accessor {accessor} needs {needed} bytes but its view holds {available}")]
    AccessorOverrun {
        accessor: usize,
        needed: usize,
        available: usize,
    },

    #[error("Buffer view {view} does not exist")]
    UnknownView { view: u32 },
}

/// Reject documents containing values JSON cannot encode.
///
/// serde_json writes non-finite floats as `null`, which would silently
/// corrupt bounds and weights, so they are caught here instead.
pub fn scan_json_values(root: &json::Root) -> Result<(), GlbError> {
    for (i, accessor) in root.accessors.iter().enumerate() {
        if let Some(min) = &accessor.min {
            scan_value(min, &format!("accessors[{}].min", i))?;
        }
        if let Some(max) = &accessor.max {
            scan_value(max, &format!("accessors[{}].max", i))?;
        }
    }

    for (i, mesh) in root.meshes.iter().enumerate() {
        if let Some(weights) = &mesh.weights {
            scan_floats(weights, &format!("meshes[{}].weights", i))?;
        }
    }

    for (i, node) in root.nodes.iter().enumerate() {
        if let Some(weights) = &node.weights {
            scan_floats(weights, &format!("nodes[{}].weights", i))?;
        }
    }

    Ok(())
}

fn scan_value(value: &json::Value, path: &str) -> Result<(), GlbError> {
    match value {
        json::Value::Null => Err(GlbError::NonFinite {
            path: path.to_string(),
        }),
        json::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                scan_value(item, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        json::Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Ok(()),
            _ => Err(GlbError::NonFinite {
                path: path.to_string(),
            }),
        },
        _ => Ok(()),
    }
}

fn scan_floats(values: &[f32], path: &str) -> Result<(), GlbError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(GlbError::NonFinite {
            path: format!("{}[{}]", path, i),
        }),
        None => Ok(()),
    }
}

/// Assemble the final GLB binary.
///
/// The document is scanned first; nothing is produced for a document that
/// cannot be represented.
pub fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Result<Vec<u8>, GlbError> {
    scan_json_values(root)?;

    let json_bytes = serde_json::to_vec(root)?;

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    // Total file length
    let total_length = 12 + 8 + json_chunk_length + 8 + buffer_chunk_length;
    if total_length > u32::MAX as usize {
        return Err(GlbError::TooLarge {
            length: total_length,
        });
    }

    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);
    glb.extend(std::iter::repeat_n(0x20u8, json_padding)); // pad with spaces

    // BIN chunk
    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat_n(0u8, buffer_padding)); // pad with zeros

    Ok(glb)
}
