//! Cdx Layout
//!
//! A retained-mode control hierarchy for game menus and panels.
//!
//! Controls are stored in a [`ControlTree`] arena and addressed by
//! [`ControlId`]. There is no layout engine: containers are arranged
//! explicitly with [`ControlTree::layout_column`] and
//! [`ControlTree::layout_row`], and each control's size is computed from its
//! content and cached until something below it changes.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use cdx_core::{FontId, MonospaceMeasurer, Vec2};
//! use cdx_layout::{ControlTree, TextControl};
//!
//! let mut tree = ControlTree::new(Rc::new(MonospaceMeasurer::new(10.0, 20.0)));
//! let panel = tree.create_panel();
//! for text in ["Play", "Options", "Quit"] {
//!     let label = tree.create_text(TextControl::new(text, FontId(0)));
//!     tree.add_child(panel, label).unwrap();
//! }
//! tree.layout_column(panel, 0.0, 0.0, 10.0).unwrap();
//!
//! assert_eq!(tree.size(panel), Some(Vec2::new(70.0, 80.0)));
//! ```

pub mod button;
pub mod error;
pub mod event;
pub mod image;
pub mod text;
pub mod tree;

mod dispatch;
mod draw;
mod layout;

pub use button::{ButtonControl, ButtonState, TextAlign, TextScale, CLICK_FEEDBACK};
pub use error::{ControlError, Result};
pub use event::ControlEvent;
pub use image::ImageControl;
pub use text::TextControl;
pub use tree::{ControlId, ControlKind, ControlTree};
