//! Append-only binary buffer packing with 4-byte aligned views

use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Every buffer view offset is a multiple of this
pub const ALIGNMENT: usize = 4;

/// Buffer view index returned by [`BufferPacker::append`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewIndex(pub u32);

impl ViewIndex {
    pub fn as_json_index(&self) -> json::Index<json::buffer::View> {
        json::Index::new(self.0)
    }
}

/// GPU usage hint recorded on a view (glTF `bufferView.target`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// 34962, ARRAY_BUFFER
    VertexAttribute,
    /// 34963, ELEMENT_ARRAY_BUFFER
    IndexData,
}

impl Usage {
    fn as_target(self) -> json::buffer::Target {
        match self {
            Usage::VertexAttribute => json::buffer::Target::ArrayBuffer,
            Usage::IndexData => json::buffer::Target::ElementArrayBuffer,
        }
    }
}

/// A byte range inside the packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub offset: usize,
    pub length: usize,
    pub usage: Option<Usage>,
}

impl View {
    /// One past the last byte of this view
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Single growing binary buffer.
///
/// Blocks are only ever appended; a view's offset never changes once it has
/// been returned, so accessors can reference it immediately.
#[derive(Debug, Default)]
pub struct BufferPacker {
    buffer: Vec<u8>,
    views: Vec<View>,
}

impl BufferPacker {
    /// Create a new empty packer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block of bytes and record a view over it.
    ///
    /// Zero padding is inserted first so the recorded offset is 4-byte aligned.
    pub fn append(&mut self, bytes: &[u8], usage: Option<Usage>) -> ViewIndex {
        align_buffer(&mut self.buffer);
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        let index = ViewIndex(self.views.len() as u32);
        self.views.push(View {
            offset,
            length: bytes.len(),
            usage,
        });

        tracing::trace!(
            view = index.0,
            offset,
            length = bytes.len(),
            "appended buffer view"
        );
        index
    }

    /// Append Vec3 f32 data (positions, normals, morph deltas)
    pub fn append_vec3(&mut self, data: &[[f32; 3]], usage: Option<Usage>) -> ViewIndex {
        self.append(bytemuck::cast_slice(data), usage)
    }

    /// Append Vec2 f32 data (UVs)
    pub fn append_vec2(&mut self, data: &[[f32; 2]], usage: Option<Usage>) -> ViewIndex {
        self.append(bytemuck::cast_slice(data), usage)
    }

    /// Append scalar f32 data (keyframe times, flattened weights)
    pub fn append_scalars(&mut self, data: &[f32]) -> ViewIndex {
        self.append(bytemuck::cast_slice(data), None)
    }

    /// Append u16 triangle indices
    pub fn append_indices_u16(&mut self, indices: &[u16]) -> ViewIndex {
        let mut bytes = Vec::with_capacity(indices.len() * 2);
        for idx in indices {
            bytes.extend_from_slice(&idx.to_le_bytes());
        }
        self.append(&bytes, Some(Usage::IndexData))
    }

    /// Total packed length, used as `buffers[0].byteLength`
    pub fn byte_length(&self) -> usize {
        self.buffer.len()
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the recorded views
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Consume the packer, returning the raw buffer and its views
    pub fn into_parts(self) -> (Vec<u8>, Vec<View>) {
        (self.buffer, self.views)
    }

    /// Look up a single view
    pub fn view(&self, index: ViewIndex) -> Option<&View> {
        self.views.get(index.0 as usize)
    }

    /// Convert the recorded views to glTF bufferViews referencing buffer 0
    pub fn json_views(&self) -> Vec<json::buffer::View> {
        self.views
            .iter()
            .map(|view| json::buffer::View {
                buffer: json::Index::new(0),
                byte_length: (view.length as u64).into(),
                byte_offset: Some((view.offset as u64).into()),
                byte_stride: None,
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                target: view.usage.map(|u| Valid(u.as_target())),
            })
            .collect()
    }
}

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    while !buffer.len().is_multiple_of(ALIGNMENT) {
        buffer.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_buffer() {
        let mut buffer = vec![1, 2, 3];
        align_buffer(&mut buffer);
        assert_eq!(buffer, vec![1, 2, 3, 0]);

        let mut buffer2 = vec![1, 2, 3, 4];
        align_buffer(&mut buffer2);
        assert_eq!(buffer2.len(), 4); // Already aligned
    }

    #[test]
    fn test_first_append_starts_at_zero() {
        let mut packer = BufferPacker::new();
        let view = packer.append_vec3(&[[0.0, 1.0, 2.0]], Some(Usage::VertexAttribute));

        assert_eq!(view, ViewIndex(0));
        assert_eq!(packer.views()[0].offset, 0);
        assert_eq!(packer.views()[0].length, 12);
        assert_eq!(packer.byte_length(), 12);
    }

    #[test]
    fn test_padding_goes_before_next_view() {
        let mut packer = BufferPacker::new();
        // 3 indices * 2 bytes = 6 bytes, buffer stays unpadded until the next append
        packer.append_indices_u16(&[0, 1, 2]);
        assert_eq!(packer.byte_length(), 6);

        let next = packer.append(&[0xAB; 5], None);
        let view = packer.view(next).unwrap();
        assert_eq!(view.offset, 8);
        assert_eq!(view.length, 5);
        assert_eq!(&packer.data()[6..8], &[0, 0]);
        assert_eq!(packer.byte_length(), 13);
    }

    #[test]
    fn test_earlier_views_are_stable() {
        let mut packer = BufferPacker::new();
        let a = packer.append(&[1, 2, 3], None);
        let before = *packer.view(a).unwrap();
        packer.append(&[4; 10], None);
        packer.append_scalars(&[1.0, 2.0]);

        assert_eq!(*packer.view(a).unwrap(), before);
        assert_eq!(&packer.data()[0..3], &[1, 2, 3]);
        for view in packer.views() {
            assert_eq!(view.offset % ALIGNMENT, 0);
            assert!(view.end() <= packer.byte_length());
        }
    }

    #[test]
    fn test_json_views_carry_targets() {
        let mut packer = BufferPacker::new();
        packer.append_vec2(&[[0.0, 1.0]], Some(Usage::VertexAttribute));
        packer.append_indices_u16(&[0, 1, 2]);
        packer.append(b"\x89PNG", None);

        let views = packer.json_views();
        assert_eq!(views.len(), 3);
        assert!(matches!(
            views[0].target,
            Some(Valid(json::buffer::Target::ArrayBuffer))
        ));
        assert!(matches!(
            views[1].target,
            Some(Valid(json::buffer::Target::ElementArrayBuffer))
        ));
        assert!(views[2].target.is_none());
        assert_eq!(views[2].byte_offset.map(|o| o.0), Some(16));
    }
}
