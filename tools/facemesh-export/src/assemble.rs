//! glTF document assembly for a mesh sequence
//!
//! Packs the base frame, morph deltas, textures and keyframes into one
//! buffer in a fixed order and wires them into a single-mesh document:
//!
//! positions, normals, UVs, indices, one delta block per target,
//! base color image, normal map image, keyframe times, keyframe weights.

use crate::animation::AnimationPlan;
use crate::error::ExportError;
use crate::mesh::{MAX_VERTEX_COUNT, MeshFrame};
use crate::morph::MorphTarget;
use crate::texture::{TextureSlot, Textures};
use morph_glb::{
    AccessorTable, Bounds, BufferPacker, ComponentType, GltfBuilder, MorphMeshAccessors, Shape,
    Usage, json,
};

/// `asset.generator` of every exported document
pub const GENERATOR: &str = concat!("facemesh-export ", env!("CARGO_PKG_VERSION"));

const MESH_NAME: &str = "FaceMesh";
const MATERIAL_NAME: &str = "FaceMaterial";
const ANIMATION_NAME: &str = "MorphAnimation";
const SCENE_NAME: &str = "Scene";

/// A complete document and the buffer it references
#[derive(Debug)]
pub struct AssembledDocument {
    pub root: json::Root,
    pub buffer: Vec<u8>,
    /// Number of animation keyframes (0 when static)
    pub keyframes: usize,
}

/// Check array lengths and index ranges agree with the base frame
pub fn validate_geometry(base: &MeshFrame, targets: &[MorphTarget]) -> Result<(), ExportError> {
    let vertex_count = base.vertex_count();

    let counts = [("normals", base.normals.len()), ("uvs", base.uvs.len())];
    let deltas = targets.iter().map(|t| ("morph deltas", t.deltas.len()));
    for (attribute, actual) in counts.into_iter().chain(deltas) {
        if actual != vertex_count {
            return Err(ExportError::AttributeCountMismatch {
                attribute,
                expected: vertex_count,
                actual,
            });
        }
    }

    if vertex_count > MAX_VERTEX_COUNT {
        return Err(ExportError::IndexOverflow {
            path: base.source.clone(),
            vertices: vertex_count,
            max: MAX_VERTEX_COUNT,
        });
    }

    if let Some(&index) = base
        .faces
        .iter()
        .flatten()
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(ExportError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    Ok(())
}

fn validate_plan(plan: &AnimationPlan, target_count: usize) -> Result<(), ExportError> {
    if let Some(weights) = plan.mesh_weights() {
        if weights.len() != target_count {
            return Err(ExportError::WeightCountMismatch {
                expected: target_count,
                actual: weights.len(),
            });
        }
    }

    if let Some(keyframes) = plan.keyframes() {
        let expected = keyframes.len() * target_count;
        if keyframes.weights.len() != expected {
            return Err(ExportError::WeightCountMismatch {
                expected,
                actual: keyframes.weights.len(),
            });
        }
    }

    Ok(())
}

/// Build the document for `base` plus `targets`.
///
/// Everything is validated before the first byte is packed.
pub fn assemble_document(
    base: &MeshFrame,
    targets: &[MorphTarget],
    textures: &Textures,
    plan: &AnimationPlan,
) -> Result<AssembledDocument, ExportError> {
    validate_geometry(base, targets)?;
    validate_plan(plan, targets.len())?;

    let vertex_count = base.vertex_count();
    let indices = base.indices_u16();

    let mut packer = BufferPacker::new();
    let mut accessors = AccessorTable::new();

    // Geometry
    let view = packer.append_vec3(&base.positions, Some(Usage::VertexAttribute));
    let positions = accessors
        .push(
            &packer,
            view,
            ComponentType::F32,
            Shape::Vec3,
            vertex_count,
            Some(Bounds::of_vec3(&base.positions)),
        )
        .map_err(ExportError::Packing)?;

    let view = packer.append_vec3(&base.normals, Some(Usage::VertexAttribute));
    let normals = accessors
        .push(&packer, view, ComponentType::F32, Shape::Vec3, vertex_count, None)
        .map_err(ExportError::Packing)?;

    let view = packer.append_vec2(&base.uvs, Some(Usage::VertexAttribute));
    let uvs = accessors
        .push(&packer, view, ComponentType::F32, Shape::Vec2, vertex_count, None)
        .map_err(ExportError::Packing)?;

    let view = packer.append_indices_u16(&indices);
    let index_accessor = accessors
        .push(
            &packer,
            view,
            ComponentType::U16,
            Shape::Scalar,
            indices.len(),
            Some(Bounds::of_indices(&indices)),
        )
        .map_err(ExportError::Packing)?;

    // Morph targets, in frame order
    let mut target_accessors = Vec::with_capacity(targets.len());
    for target in targets {
        let view = packer.append_vec3(&target.deltas, Some(Usage::VertexAttribute));
        let accessor = accessors
            .push(
                &packer,
                view,
                ComponentType::F32,
                Shape::Vec3,
                vertex_count,
                Some(target.bounds()),
            )
            .map_err(ExportError::Packing)?;
        target_accessors.push(accessor);
    }

    // Textures, embedded verbatim
    let mut builder = GltfBuilder::new();
    let mut base_color_texture = None;
    let mut normal_texture = None;
    for (slot, texture) in textures.iter() {
        let view = packer.append(&texture.bytes, None);
        let name = texture
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| slot.label().to_string());
        builder = builder.add_embedded_texture(&name, view, texture.mime_type);
        match slot {
            TextureSlot::BaseColor => base_color_texture = builder.last_texture_index(),
            TextureSlot::NormalMap => normal_texture = builder.last_texture_index(),
        }
    }

    // Keyframes
    let mut animation = None;
    if let Some(keyframes) = plan.keyframes() {
        let view = packer.append_scalars(&keyframes.times);
        let times = accessors
            .push(
                &packer,
                view,
                ComponentType::F32,
                Shape::Scalar,
                keyframes.len(),
                Some(Bounds::of_scalars(&keyframes.times)),
            )
            .map_err(ExportError::Packing)?;

        let view = packer.append_scalars(&keyframes.weights);
        let weights = accessors
            .push(
                &packer,
                view,
                ComponentType::F32,
                Shape::Scalar,
                keyframes.weights.len(),
                None,
            )
            .map_err(ExportError::Packing)?;

        animation = Some((times, weights, keyframes.interpolation));
    }

    let mesh = MorphMeshAccessors::new(positions, normals, uvs, index_accessor)
        .with_targets(target_accessors);

    builder = builder
        .add_material(MATERIAL_NAME, base_color_texture, normal_texture)
        .add_morph_mesh(MESH_NAME, &mesh, Some(0), plan.mesh_weights())
        .add_mesh_node(MESH_NAME, 0, None);

    if let Some((times, weights, interpolation)) = animation {
        builder = builder.add_weights_animation(ANIMATION_NAME, 0, times, weights, interpolation);
    }

    let root = builder
        .add_scene(SCENE_NAME, &[0])
        .build(&packer, accessors, GENERATOR);

    tracing::debug!(
        "Assembled document: {} views, {} accessors, {} buffer bytes",
        root.buffer_views.len(),
        root.accessors.len(),
        packer.byte_length()
    );

    let (buffer, _) = packer.into_parts();
    Ok(AssembledDocument {
        root,
        buffer,
        keyframes: plan.keyframes().map_or(0, |k| k.len()),
    })
}
