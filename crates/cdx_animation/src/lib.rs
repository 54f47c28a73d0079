//! Cdx Animation System
//!
//! Frame-driven motion for the Cdx UI toolkit.
//!
//! # Features
//!
//! - **Scroll tracking**: drag and flick gestures integrated into a view
//!   offset with constant deceleration and rubber-band edges
//! - **Transitions**: linear, frame-rate independent show/hide stepping
//! - **Easing**: curves for mapping transition progress to slide offsets

pub mod easing;
pub mod scroll;
pub mod transition;

pub use easing::Easing;
pub use scroll::{apply_velocity, soft_clamp, ScrollConfig, ScrollTracker, GESTURES_NEEDED};
pub use transition::{advance_transition, TransitionDirection, TransitionStep};
