//! Typed accessors over packed buffer views

use crate::buffer::{BufferPacker, ViewIndex};
use crate::glb::GlbError;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by [`AccessorTable::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Component types used by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// 5126
    F32,
    /// 5123
    U16,
}

impl ComponentType {
    pub fn size(self) -> usize {
        match self {
            ComponentType::F32 => 4,
            ComponentType::U16 => 2,
        }
    }

    fn as_json(self) -> json::accessor::ComponentType {
        match self {
            ComponentType::F32 => json::accessor::ComponentType::F32,
            ComponentType::U16 => json::accessor::ComponentType::U16,
        }
    }
}

/// Element shape of an accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vec2,
    Vec3,
}

impl Shape {
    pub fn components(self) -> usize {
        match self {
            Shape::Scalar => 1,
            Shape::Vec2 => 2,
            Shape::Vec3 => 3,
        }
    }

    fn as_json(self) -> json::accessor::Type {
        match self {
            Shape::Scalar => json::accessor::Type::Scalar,
            Shape::Vec2 => json::accessor::Type::Vec2,
            Shape::Vec3 => json::accessor::Type::Vec3,
        }
    }
}

/// Per-component min/max written to `accessor.min` / `accessor.max`
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

impl Bounds {
    /// Bounds of Vec3 data. A NaN component poisons that axis so the
    /// document scan rejects it instead of emitting a silently wrong box.
    pub fn of_vec3(data: &[[f32; 3]]) -> Self {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];

        for v in data {
            for i in 0..3 {
                min[i] = nan_min(min[i], v[i]);
                max[i] = nan_max(max[i], v[i]);
            }
        }

        if data.is_empty() {
            return Self::from_arrays([0.0; 3], [0.0; 3]);
        }
        Self::from_arrays(min, max)
    }

    /// Bounds of scalar data (keyframe times)
    pub fn of_scalars(data: &[f32]) -> Self {
        if data.is_empty() {
            return Self::from_arrays([0.0], [0.0]);
        }
        let min = data.iter().copied().fold(f32::MAX, nan_min);
        let max = data.iter().copied().fold(f32::MIN, nan_max);
        Self::from_arrays([min], [max])
    }

    /// Bounds of u16 index data
    pub fn of_indices(indices: &[u16]) -> Self {
        let min = indices.iter().copied().min().unwrap_or(0);
        let max = indices.iter().copied().max().unwrap_or(0);
        Self::from_arrays([min as f32], [max as f32])
    }

    pub fn from_arrays<const N: usize>(min: [f32; N], max: [f32; N]) -> Self {
        Self {
            min: min.to_vec(),
            max: max.to_vec(),
        }
    }

    fn to_json(values: &[f32]) -> json::Value {
        json::Value::Array(values.iter().map(|&v| json::Value::from(v)).collect())
    }
}

fn nan_min(acc: f32, v: f32) -> f32 {
    if acc.is_nan() || v.is_nan() {
        f32::NAN
    } else {
        acc.min(v)
    }
}

fn nan_max(acc: f32, v: f32) -> f32 {
    if acc.is_nan() || v.is_nan() {
        f32::NAN
    } else {
        acc.max(v)
    }
}

/// Accessors built against views of one [`BufferPacker`]
#[derive(Debug, Default)]
pub struct AccessorTable {
    accessors: Vec<json::Accessor>,
}

impl AccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accessor over `view`.
    ///
    /// Fails if `count` elements of the given type do not fit in the view.
    pub fn push(
        &mut self,
        packer: &BufferPacker,
        view: ViewIndex,
        component_type: ComponentType,
        shape: Shape,
        count: usize,
        bounds: Option<Bounds>,
    ) -> Result<AccessorIndex, GlbError> {
        let view_len = packer
            .view(view)
            .map(|v| v.length)
            .ok_or(GlbError::UnknownView { view: view.0 })?;
        let needed = count * component_type.size() * shape.components();
        if needed > view_len {
            return Err(GlbError::AccessorOverrun {
                accessor: self.accessors.len(),
                needed,
                available: view_len,
            });
        }

        let (min, max) = match bounds {
            Some(b) => (Some(Bounds::to_json(&b.min)), Some(Bounds::to_json(&b.max))),
            None => (None, None),
        };

        let index = AccessorIndex(self.accessors.len() as u32);
        self.accessors.push(json::Accessor {
            buffer_view: Some(view.as_json_index()),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(
                component_type.as_json(),
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(shape.as_json()),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    pub fn into_vec(self) -> Vec<json::Accessor> {
        self.accessors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Usage;

    #[test]
    fn test_bounds_vec3() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, -2.0, -3.0]];
        let bounds = Bounds::of_vec3(&positions);
        assert_eq!(bounds.min, vec![-1.0, -2.0, -3.0]);
        assert_eq!(bounds.max, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bounds_nan_poisons_axis() {
        let bounds = Bounds::of_vec3(&[[0.0, f32::NAN, 0.0], [1.0, 1.0, 1.0]]);
        assert_eq!(bounds.min[0], 0.0);
        assert!(bounds.min[1].is_nan());
        assert!(bounds.max[1].is_nan());
    }

    #[test]
    fn test_bounds_scalars_and_indices() {
        let times = Bounds::of_scalars(&[1.0 / 30.0, 2.0 / 30.0, 3.0 / 30.0]);
        assert_eq!(times.min, vec![1.0 / 30.0]);
        assert_eq!(times.max, vec![3.0 / 30.0]);

        let idx = Bounds::of_indices(&[4, 2, 9, 0]);
        assert_eq!(idx.min, vec![0.0]);
        assert_eq!(idx.max, vec![9.0]);
    }

    #[test]
    fn test_push_accessor_fits_view() {
        let mut packer = BufferPacker::new();
        let view = packer.append_vec3(&[[0.0; 3]; 4], Some(Usage::VertexAttribute));
        let mut table = AccessorTable::new();

        let idx = table
            .push(&packer, view, ComponentType::F32, Shape::Vec3, 4, None)
            .unwrap();
        assert_eq!(idx, AccessorIndex(0));
        assert_eq!(table.accessors()[0].count.0, 4);
        assert!(table.accessors()[0].min.is_none());
    }

    #[test]
    fn test_push_accessor_overrun() {
        let mut packer = BufferPacker::new();
        let view = packer.append_scalars(&[0.0, 1.0]);
        let mut table = AccessorTable::new();

        let err = table
            .push(&packer, view, ComponentType::F32, Shape::Vec3, 1, None)
            .unwrap_err();
        assert!(matches!(
            err,
            GlbError::AccessorOverrun {
                needed: 12,
                available: 8,
                ..
            }
        ));
        assert!(table.is_empty());
    }
}
