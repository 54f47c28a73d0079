//! Cdx Core
//!
//! Foundational types shared by every Cdx crate:
//!
//! - **Geometry**: `Vec2`, `Size`, `Rect`, `Color`
//! - **Input**: the per-frame `InputState` snapshot of gestures and raw touches
//! - **Render seams**: `RenderSink`, `TextMeasurer`, and `DrawContext`
//!
//! # Example
//!
//! ```rust
//! use cdx_core::input::{Gesture, InputState};
//! use cdx_core::Vec2;
//!
//! let mut input = InputState::new()
//!     .with_gesture(Gesture::tap(Vec2::new(120.0, 300.0)));
//!
//! // A control that handles the tap removes it from the frame's queue
//! let tap = input.consume_gesture(0);
//! assert!(tap.is_some());
//! assert!(input.gestures.is_empty());
//! ```

pub mod geometry;
pub mod input;
pub mod render;

pub use geometry::{Color, Rect, Size, Vec2};
pub use input::{Gesture, GestureKind, GestureSet, InputState, TouchPhase, TouchSample};
pub use render::{
    DrawCommand, DrawContext, FontId, MonospaceMeasurer, RecordingSink, RenderSink, TextMeasurer,
    TextureId, TextureInfo,
};
