//! GLTF document construction

use crate::accessor::{AccessorIndex, AccessorTable};
use crate::buffer::{BufferPacker, ViewIndex};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Keyframe interpolation for a weights sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

impl Interpolation {
    fn as_json(self) -> json::animation::Interpolation {
        match self {
            Interpolation::Step => json::animation::Interpolation::Step,
            Interpolation::Linear => json::animation::Interpolation::Linear,
        }
    }
}

/// Accessor indices for a single-primitive morph mesh
#[derive(Debug, Clone)]
pub struct MorphMeshAccessors {
    pub positions: AccessorIndex,
    pub normals: AccessorIndex,
    pub uvs: AccessorIndex,
    pub indices: AccessorIndex,
    /// One POSITION delta accessor per morph target, in frame order
    pub targets: Vec<AccessorIndex>,
}

impl MorphMeshAccessors {
    pub fn new(
        positions: AccessorIndex,
        normals: AccessorIndex,
        uvs: AccessorIndex,
        indices: AccessorIndex,
    ) -> Self {
        Self {
            positions,
            normals,
            uvs,
            indices,
            targets: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<AccessorIndex>) -> Self {
        self.targets = targets;
        self
    }
}

/// Builder for complete GLTF documents
pub struct GltfBuilder {
    images: Vec<json::Image>,
    textures: Vec<json::Texture>,
    materials: Vec<json::Material>,
    meshes: Vec<json::Mesh>,
    nodes: Vec<json::Node>,
    animations: Vec<json::Animation>,
    scenes: Vec<json::Scene>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            nodes: Vec::new(),
            animations: Vec::new(),
            scenes: Vec::new(),
        }
    }

    /// Add an image stored in a buffer view plus the texture sampling it
    pub fn add_embedded_texture(mut self, name: &str, view: ViewIndex, mime_type: &str) -> Self {
        let image_idx = self.images.len() as u32;
        self.images.push(json::Image {
            buffer_view: Some(view.as_json_index()),
            mime_type: Some(json::image::MimeType(mime_type.to_string())),
            name: Some(name.to_string()),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.textures.push(json::Texture {
            name: Some(name.to_string()),
            sampler: None,
            source: json::Index::new(image_idx),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self
    }

    /// Get the index of the last added texture
    pub fn last_texture_index(&self) -> Option<u32> {
        if self.textures.is_empty() {
            None
        } else {
            Some(self.textures.len() as u32 - 1)
        }
    }

    /// Add a PBR material with optional base color and normal textures
    pub fn add_material(
        mut self,
        name: &str,
        base_color_texture: Option<u32>,
        normal_texture: Option<u32>,
    ) -> Self {
        let pbr = json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            base_color_texture: base_color_texture.map(|index| json::texture::Info {
                index: json::Index::new(index),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        };

        self.materials.push(json::Material {
            name: Some(name.to_string()),
            alpha_cutoff: None,
            alpha_mode: Valid(json::material::AlphaMode::Opaque),
            double_sided: false,
            pbr_metallic_roughness: pbr,
            normal_texture: normal_texture.map(|index| json::material::NormalTexture {
                index: json::Index::new(index),
                scale: 1.0,
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self
    }

    /// Add a mesh with one triangle primitive and its morph targets.
    ///
    /// `weights` are the default morph weights; when `None` and targets exist,
    /// all weights default to zero.
    pub fn add_morph_mesh(
        mut self,
        name: &str,
        accessors: &MorphMeshAccessors,
        material: Option<u32>,
        weights: Option<Vec<f32>>,
    ) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );
        attributes.insert(
            Valid(json::mesh::Semantic::Normals),
            accessors.normals.as_json_index(),
        );
        attributes.insert(
            Valid(json::mesh::Semantic::TexCoords(0)),
            accessors.uvs.as_json_index(),
        );

        let has_targets = !accessors.targets.is_empty();
        let targets = has_targets.then(|| {
            accessors
                .targets
                .iter()
                .map(|t| json::mesh::MorphTarget {
                    positions: Some(t.as_json_index()),
                    normals: None,
                    tangents: None,
                })
                .collect()
        });

        let weights = match weights {
            Some(w) => Some(w),
            None if has_targets => Some(vec![0.0; accessors.targets.len()]),
            None => None,
        };

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(accessors.indices.as_json_index()),
            material: material.map(json::Index::new),
            mode: Valid(json::mesh::Mode::Triangles),
            targets,
        };

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights,
        });
        self
    }

    /// Add a node instancing a mesh
    pub fn add_mesh_node(mut self, name: &str, mesh: u32, weights: Option<Vec<f32>>) -> Self {
        self.nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(mesh)),
            name: Some(name.to_string()),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights,
        });
        self
    }

    /// Get the current node count
    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Add an animation with a single sampler driving a node's morph weights
    pub fn add_weights_animation(
        mut self,
        name: &str,
        node: u32,
        times: AccessorIndex,
        weights: AccessorIndex,
        interpolation: Interpolation,
    ) -> Self {
        let samplers = vec![json::animation::Sampler {
            input: times.as_json_index(),
            interpolation: Valid(interpolation.as_json()),
            output: weights.as_json_index(),
            extensions: Default::default(),
            extras: Default::default(),
        }];
        let channels = vec![json::animation::Channel {
            sampler: json::Index::new(0),
            target: json::animation::Target {
                node: json::Index::new(node),
                path: Valid(json::animation::Property::MorphTargetWeights),
                extensions: Default::default(),
                extras: Default::default(),
            },
            extensions: Default::default(),
            extras: Default::default(),
        }];

        self.animations.push(json::Animation {
            channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            samplers,
        });
        self
    }

    /// Add a scene
    pub fn add_scene(mut self, name: &str, root_nodes: &[u32]) -> Self {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
        self
    }

    /// Build final GLTF Root with views from the packer and the accessor table.
    ///
    /// `buffers[0].byteLength` is the packer's final length.
    pub fn build(
        self,
        packer: &BufferPacker,
        accessors: AccessorTable,
        generator: &str,
    ) -> json::Root {
        let buffers = vec![json::Buffer {
            byte_length: (packer.byte_length() as u64).into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }];

        json::Root {
            accessors: accessors.into_vec(),
            animations: self.animations,
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: packer.json_views(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: self.images,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: Vec::new(),
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: Vec::new(),
            textures: self.textures,
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}
