//! Single-line text label

use cdx_core::{Color, FontId};

/// A string drawn in one font
///
/// Auto-sizes to the measured extent of its text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextControl {
    pub(crate) text: String,
    pub(crate) font: Option<FontId>,
    pub color: Color,
}

impl TextControl {
    pub fn new(text: impl Into<String>, font: FontId) -> Self {
        Self {
            text: text.into(),
            font: Some(font),
            color: Color::WHITE,
        }
    }

    /// A label with no font yet; it must be given one before drawing
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            font: None,
            color: Color::WHITE,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> Option<FontId> {
        self.font
    }
}

impl Default for TextControl {
    fn default() -> Self {
        Self::empty()
    }
}
