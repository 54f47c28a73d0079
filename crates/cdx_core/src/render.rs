//! Render and measurement seams
//!
//! The toolkit never talks to a graphics device. Controls and screens draw
//! into a [`RenderSink`] supplied by the host, and size text through a
//! [`TextMeasurer`]. Two headless implementations are provided:
//! [`RecordingSink`] and [`MonospaceMeasurer`].

use std::time::Duration;

use crate::geometry::{Color, Rect, Vec2};

/// Handle to a texture owned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Handle to a font owned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// A texture handle together with its pixel dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: f32,
    pub height: f32,
}

impl TextureInfo {
    pub fn new(id: TextureId, width: f32, height: f32) -> Self {
        Self { id, width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Measures rendered text
pub trait TextMeasurer {
    /// Size of `text` rendered in `font` at scale 1
    fn measure(&self, font: FontId, text: &str) -> Vec2;

    /// Vertical distance between baselines
    fn line_spacing(&self, font: FontId) -> f32;
}

/// Fixed-advance measurer for headless runs and tests
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMeasurer {
    pub glyph_width: f32,
    pub line_height: f32,
}

impl MonospaceMeasurer {
    pub fn new(glyph_width: f32, line_height: f32) -> Self {
        Self {
            glyph_width,
            line_height,
        }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new(10.0, 20.0)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, _font: FontId, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::new(0.0, self.line_height);
        }
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Vec2::new(
            widest as f32 * self.glyph_width,
            lines as f32 * self.line_height,
        )
    }

    fn line_spacing(&self, _font: FontId) -> f32 {
        self.line_height
    }
}

/// Host drawing surface
///
/// Draw calls between `begin` and `end` belong to one batch.
pub trait RenderSink {
    fn begin(&mut self) {}

    fn end(&mut self) {}

    /// Fill a rectangle with a solid color
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a texture into `dest`
    ///
    /// `texture: None` is the host's blank white texture. `source: None`
    /// samples the whole texture.
    fn draw_texture(
        &mut self,
        texture: Option<TextureId>,
        dest: Rect,
        source: Option<Rect>,
        color: Color,
    );

    /// Draw a string with its top-left corner at `position`
    fn draw_text(&mut self, font: FontId, text: &str, position: Vec2, color: Color, scale: f32);
}

/// A single recorded draw call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Begin,
    End,
    FillRect {
        rect: Rect,
        color: Color,
    },
    Texture {
        texture: Option<TextureId>,
        dest: Rect,
        source: Option<Rect>,
        color: Color,
    },
    Text {
        font: FontId,
        text: String,
        position: Vec2,
        color: Color,
        scale: f32,
    },
}

/// Render sink that records every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All text draws in order, with their positions
    pub fn texts(&self) -> Vec<(String, Vec2)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, position, .. } => Some((text.clone(), *position)),
                _ => None,
            })
            .collect()
    }

    /// Position of the first text draw matching `text`
    pub fn text_position(&self, text: &str) -> Option<Vec2> {
        self.texts()
            .into_iter()
            .find(|(t, _)| t == text)
            .map(|(_, p)| p)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderSink for RecordingSink {
    fn begin(&mut self) {
        self.commands.push(DrawCommand::Begin);
    }

    fn end(&mut self) {
        self.commands.push(DrawCommand::End);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_texture(
        &mut self,
        texture: Option<TextureId>,
        dest: Rect,
        source: Option<Rect>,
        color: Color,
    ) {
        self.commands.push(DrawCommand::Texture {
            texture,
            dest,
            source,
            color,
        });
    }

    fn draw_text(&mut self, font: FontId, text: &str, position: Vec2, color: Color, scale: f32) {
        self.commands.push(DrawCommand::Text {
            font,
            text: text.to_string(),
            position,
            color,
            scale,
        });
    }
}

/// Context handed down the draw traversal
pub struct DrawContext<'a> {
    /// Absolute position of the control being drawn
    pub offset: Vec2,
    /// Transition alpha of the owning screen (1 = fully shown)
    pub alpha: f32,
    /// Total time since the host started, for pulsing effects
    pub total_time: Duration,
    pub sink: &'a mut dyn RenderSink,
}

impl<'a> DrawContext<'a> {
    pub fn new(sink: &'a mut dyn RenderSink) -> Self {
        Self {
            offset: Vec2::ZERO,
            alpha: 1.0,
            total_time: Duration::ZERO,
            sink,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_total_time(mut self, total_time: Duration) -> Self {
        self.total_time = total_time;
        self
    }

    /// Reborrow with a different offset for a child
    pub fn at(&mut self, offset: Vec2) -> DrawContext<'_> {
        DrawContext {
            offset,
            alpha: self.alpha,
            total_time: self.total_time,
            sink: &mut *self.sink,
        }
    }
}
