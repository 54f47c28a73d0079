//! Sprite control

use cdx_core::{Color, TextureInfo, Vec2};

/// Displays a texture, or a solid rectangle when no texture is set
///
/// Auto-sizes to the texture's pixel size (zero without a texture), so a
/// solid rectangle needs an explicit size.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageControl {
    pub(crate) texture: Option<TextureInfo>,
    /// Modulation color; white leaves the texture unchanged
    pub color: Color,
    /// Top-left of the sampled region within the texture
    pub source_origin: Vec2,
    /// Size of the sampled region; the control size when unset
    pub source_size: Option<Vec2>,
}

impl ImageControl {
    pub fn new(texture: TextureInfo) -> Self {
        Self {
            texture: Some(texture),
            ..Self::blank()
        }
    }

    pub fn blank() -> Self {
        Self {
            texture: None,
            color: Color::WHITE,
            source_origin: Vec2::ZERO,
            source_size: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn texture(&self) -> Option<TextureInfo> {
        self.texture
    }
}

impl Default for ImageControl {
    fn default() -> Self {
        Self::blank()
    }
}
