//! Texture discovery and loading
//!
//! Textures live beside the base frame: `<stem>.png` is the base color and
//! `<stem>_normals.png` the normal map. Bytes are embedded verbatim; the
//! `image` crate is only used to identify the format and read the dimensions.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Encoded image embedded into the GLB
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Which material slot a texture fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    BaseColor,
    NormalMap,
}

impl TextureSlot {
    /// File name beside a frame with the given stem
    pub fn file_name(self, stem: &str) -> String {
        match self {
            TextureSlot::BaseColor => format!("{}.png", stem),
            TextureSlot::NormalMap => format!("{}_normals.png", stem),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextureSlot::BaseColor => "base color",
            TextureSlot::NormalMap => "normal map",
        }
    }
}

/// Textures found for a sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Textures {
    pub base_color: Option<TextureAsset>,
    pub normal_map: Option<TextureAsset>,
    /// Expected texture files that were absent or unusable
    pub missing: Vec<PathBuf>,
}

impl Textures {
    /// Load both textures for the frame at `base_frame`
    pub fn for_frame(base_frame: &Path) -> Self {
        let mut textures = Textures::default();
        for slot in [TextureSlot::BaseColor, TextureSlot::NormalMap] {
            let path = texture_path(base_frame, slot);
            match load_texture(&path, slot) {
                Some(asset) => match slot {
                    TextureSlot::BaseColor => textures.base_color = Some(asset),
                    TextureSlot::NormalMap => textures.normal_map = Some(asset),
                },
                None => textures.missing.push(path),
            }
        }
        textures
    }

    /// Loaded textures in embedding order (base color, then normal map)
    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &TextureAsset)> {
        self.base_color
            .iter()
            .map(|t| (TextureSlot::BaseColor, t))
            .chain(self.normal_map.iter().map(|t| (TextureSlot::NormalMap, t)))
    }
}

/// Conventional texture path for a frame
pub fn texture_path(base_frame: &Path, slot: TextureSlot) -> PathBuf {
    let stem = base_frame
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    base_frame.with_file_name(slot.file_name(&stem))
}

/// Load a texture, or `None` when it is missing or unusable.
///
/// Never fatal: the material slot is simply left empty.
pub fn load_texture(path: &Path, slot: TextureSlot) -> Option<TextureAsset> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Missing {} texture {:?}, slot omitted", slot.label(), path);
            return None;
        }
        Err(e) => {
            tracing::warn!("Cannot read {} texture {:?}: {}", slot.label(), path, e);
            return None;
        }
    };

    match identify(&bytes) {
        Ok((mime_type, width, height)) => {
            tracing::debug!(
                "Loaded {} texture {:?}: {}x{} {}",
                slot.label(),
                path,
                width,
                height,
                mime_type
            );
            Some(TextureAsset {
                path: path.to_path_buf(),
                bytes,
                mime_type,
                width,
                height,
            })
        }
        Err(reason) => {
            tracing::warn!(
                "Skipping {} texture {:?}: {}",
                slot.label(),
                path,
                reason
            );
            None
        }
    }
}

/// Sniff format and dimensions without decoding pixel data
fn identify(bytes: &[u8]) -> Result<(&'static str, u32, u32), String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;

    let mime_type = match reader.format() {
        Some(ImageFormat::Png) => "image/png",
        Some(ImageFormat::Jpeg) => "image/jpeg",
        Some(other) => return Err(format!("unsupported image format {:?}", other)),
        None => return Err("unrecognized image data".to_string()),
    };

    let (width, height) = reader.into_dimensions().map_err(|e| e.to_string())?;
    Ok((mime_type, width, height))
}
