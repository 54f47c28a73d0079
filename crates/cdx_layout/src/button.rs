//! Tappable texture button
//!
//! A tap inside the button switches it to [`ButtonState::Clicked`] and shows
//! the clicked texture. The click itself is reported only after the clicked
//! texture has been visible for [`CLICK_FEEDBACK`], so the press is seen
//! before whatever the click triggers takes over the screen.

use std::time::Duration;

use cdx_core::{Color, FontId, Rect, TextMeasurer, TextureId, Vec2};

/// How long the clicked texture shows before the click is reported
pub const CLICK_FEEDBACK: Duration = Duration::from_millis(200);

/// Default width and height
pub const DEFAULT_BUTTON_SIZE: f32 = 50.0;

/// Horizontal inset of left/right aligned text
const TEXT_INSET: f32 = 50.0;

/// Padding added around the text when a dimension is derived from it
const TEXT_PADDING: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonState {
    #[default]
    Normal,
    Clicked,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    #[default]
    Centre,
}

/// Text size relative to the font's native size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextScale {
    Small,
    #[default]
    Medium,
    Big,
}

impl TextScale {
    pub fn factor(self) -> f32 {
        match self {
            TextScale::Small => 0.75,
            TextScale::Medium => 1.0,
            TextScale::Big => 1.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonControl {
    pub normal_texture: Option<TextureId>,
    /// Falls back to the normal texture when unset
    pub clicked_texture: Option<TextureId>,
    pub text: Option<String>,
    pub font: Option<FontId>,
    pub text_visible: bool,
    pub foreground: Color,
    pub clicked_foreground: Color,
    pub alignment: TextAlign,
    pub text_scale: TextScale,
    /// Width and height; a zero component is derived from the text extent
    pub size: Vec2,
    /// Explicit hit area in root coordinates, replacing the drawn bounds
    pub click_area: Option<Rect>,
    state: ButtonState,
    clicked_for: Duration,
}

impl ButtonControl {
    pub fn new(normal_texture: TextureId) -> Self {
        Self {
            normal_texture: Some(normal_texture),
            ..Self::default()
        }
    }

    pub fn with_clicked_texture(mut self, texture: TextureId) -> Self {
        self.clicked_texture = Some(texture);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>, font: FontId) -> Self {
        self.text = Some(text.into());
        self.font = Some(font);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height);
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlign) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_text_scale(mut self, scale: TextScale) -> Self {
        self.text_scale = scale;
        self
    }

    pub fn with_click_area(mut self, area: Rect) -> Self {
        self.click_area = Some(area);
        self
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Texture for the current state
    pub fn current_texture(&self) -> Option<TextureId> {
        match self.state {
            ButtonState::Normal => self.normal_texture,
            ButtonState::Clicked => self.clicked_texture.or(self.normal_texture),
        }
    }

    pub fn current_foreground(&self) -> Color {
        match self.state {
            ButtonState::Normal => self.foreground,
            ButtonState::Clicked => self.clicked_foreground,
        }
    }

    /// Scaled text extent, truncated to whole pixels
    pub fn text_extent(&self, measurer: &dyn TextMeasurer) -> Vec2 {
        match (&self.text, self.font) {
            (Some(text), Some(font)) if !text.is_empty() => {
                (measurer.measure(font, text) * self.text_scale.factor()).trunc()
            }
            _ => Vec2::ZERO,
        }
    }

    /// Drawn size, deriving zero dimensions from the text
    pub fn resolved_size(&self, measurer: &dyn TextMeasurer) -> Vec2 {
        let mut size = self.size;
        if size.x == 0.0 || size.y == 0.0 {
            let text = self.text_extent(measurer);
            if size.x == 0.0 {
                size.x = text.x + TEXT_PADDING;
            }
            if size.y == 0.0 {
                size.y = text.y + TEXT_PADDING;
            }
        }
        size
    }

    /// Top-left of the label relative to the button's top-left
    pub fn text_offset(&self, size: Vec2, measurer: &dyn TextMeasurer) -> Vec2 {
        let text = self.text_extent(measurer);
        let x = match self.alignment {
            TextAlign::Left => TEXT_INSET,
            TextAlign::Right => size.x - text.x - TEXT_INSET,
            TextAlign::Centre => (size.x / 2.0 - text.x / 2.0).trunc(),
        };
        Vec2::new(x, (size.y / 2.0 - text.y / 2.0).trunc())
    }

    pub(crate) fn press(&mut self) {
        self.state = ButtonState::Clicked;
        self.clicked_for = Duration::ZERO;
    }

    /// Advance the click feedback timer; true when the click completes
    pub(crate) fn tick(&mut self, dt: Duration) -> bool {
        if self.state != ButtonState::Clicked {
            return false;
        }
        self.clicked_for += dt;
        if self.clicked_for > CLICK_FEEDBACK {
            self.state = ButtonState::Normal;
            self.clicked_for = Duration::ZERO;
            true
        } else {
            false
        }
    }
}

impl Default for ButtonControl {
    fn default() -> Self {
        Self {
            normal_texture: None,
            clicked_texture: None,
            text: None,
            font: None,
            text_visible: true,
            foreground: Color::BLACK,
            clicked_foreground: Color::BLACK,
            alignment: TextAlign::default(),
            text_scale: TextScale::default(),
            size: Vec2::new(DEFAULT_BUTTON_SIZE, DEFAULT_BUTTON_SIZE),
            click_area: None,
            state: ButtonState::Normal,
            clicked_for: Duration::ZERO,
        }
    }
}
