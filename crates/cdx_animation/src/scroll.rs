//! Drag/flick scroll tracking with rubber-band edges
//!
//! `ScrollTracker` turns touch samples and drag/flick gestures into a view
//! rectangle that moves over a larger canvas. It only computes where the
//! view is; how the host renders through that view is up to the host.
//!
//! # Motion model
//!
//! - **Tracking**: while a finger is down, drag deltas accumulate into an
//!   unclamped origin. The visible origin is a soft clamp of it, so dragging
//!   past an edge moves the view only a third as far, up to a hard limit.
//! - **Flicking**: a mostly-vertical flick hands the view a velocity that
//!   decays at a constant rate.
//! - **Spring return**: whenever the view is past an edge and not tracking,
//!   it is pulled back proportionally plus a minimum step each frame, never
//!   overshooting the edge.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use cdx_animation::ScrollTracker;
//! use cdx_core::input::{Gesture, InputState, TouchPhase, TouchSample};
//! use cdx_core::{Size, Vec2};
//!
//! let mut tracker = ScrollTracker::new(Size::new(480.0, 800.0));
//! tracker.set_canvas_size(Size::new(480.0, 2000.0));
//!
//! // Finger goes down, then drags upward by 200px
//! let input = InputState::new()
//!     .with_touch(TouchSample::new(0, Vec2::new(240.0, 600.0), TouchPhase::Pressed))
//!     .with_gesture(Gesture::vertical_drag(Vec2::new(240.0, 400.0), -200.0));
//! tracker.handle_input(&input);
//! tracker.update(Duration::from_millis(16));
//!
//! assert_eq!(tracker.view_origin().y, 200.0);
//! ```

use std::time::Duration;

use cdx_core::input::{GestureKind, GestureSet, InputState};
use cdx_core::{Rect, Size, Vec2};

/// Gestures the tracker reacts to; screens hosting a scroller must enable them
pub const GESTURES_NEEDED: GestureSet = GestureSet::FLICK
    .union(GestureSet::VERTICAL_DRAG)
    .union(GestureSet::DRAG_COMPLETE);

/// Tuning for drag, flick, and edge behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    /// How far past an edge raw drag is still honored (pixels)
    pub spring_max_drag: f32,
    /// How far the view actually moves at `spring_max_drag` of overdrag
    pub spring_max_offset: f32,
    /// Fraction of the overshoot recovered per frame when springing back
    pub spring_return_rate: f32,
    /// Minimum recovery per frame when springing back (pixels)
    pub spring_return_min: f32,
    /// Flick deceleration in pixels/second²
    pub deceleration: f32,
    /// Flick velocity cap in pixels/second
    pub max_velocity: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            spring_max_drag: 400.0,
            spring_max_offset: 400.0 / 3.0,
            spring_return_rate: 0.1,
            spring_return_min: 2.0,
            deceleration: 500.0,
            max_velocity: 2000.0,
        }
    }
}

impl ScrollConfig {
    /// Config where dragging past an edge has no visible effect
    pub fn rigid() -> Self {
        Self {
            spring_max_offset: 0.0,
            ..Default::default()
        }
    }

    /// Config with faster flick decay, for short lists
    pub fn short_flick() -> Self {
        Self {
            deceleration: 1500.0,
            ..Default::default()
        }
    }
}

/// Compress a value that left `[min, max]`
///
/// Inside the range `x` is returned unchanged. Outside, the overshoot is
/// scaled by `spring_max_offset / spring_max_drag` and capped at
/// `spring_max_drag`, giving the partial-overdrag effect at list edges.
pub fn soft_clamp(x: f32, min: f32, max: f32, config: &ScrollConfig) -> f32 {
    if x < min {
        return (x - min).max(-config.spring_max_drag) * config.spring_max_offset
            / config.spring_max_drag
            + min;
    }
    if x > max {
        return (x - max).min(config.spring_max_drag) * config.spring_max_offset
            / config.spring_max_drag
            + max;
    }
    x
}

/// Integrate one axis over `dt` seconds
///
/// Moves `x` by `v`, caps and decelerates `v` toward zero without changing
/// its sign, and pulls `x` back toward `[min, max]` if it is outside.
pub fn apply_velocity(dt: f32, x: &mut f32, v: &mut f32, min: f32, max: f32, config: &ScrollConfig) {
    *x += *v * dt;

    let capped = v.clamp(-config.max_velocity, config.max_velocity);
    let speed = (capped.abs() - dt * config.deceleration).max(0.0);
    *v = if capped < 0.0 { -speed } else { speed };

    if *x < min {
        *x = (*x + (min - *x) * config.spring_return_rate + config.spring_return_min).min(min);
        *v = 0.0;
    }
    if *x > max {
        *x = (*x - (*x - max) * config.spring_return_rate - config.spring_return_min).max(max);
        *v = 0.0;
    }
}

/// Kinematic scroll state for one scrollable host
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    canvas_rect: Rect,
    view_rect: Rect,
    view_origin: Vec2,
    unclamped_view_origin: Vec2,
    velocity: Vec2,
    is_tracking: bool,
    config: ScrollConfig,
}

impl ScrollTracker {
    /// Create a tracker whose view and canvas both start as `viewport`
    pub fn new(viewport: Size) -> Self {
        Self::with_config(viewport, ScrollConfig::default())
    }

    pub fn with_config(viewport: Size, config: ScrollConfig) -> Self {
        let view_rect = viewport.to_rect();
        Self {
            canvas_rect: view_rect,
            view_rect,
            view_origin: Vec2::ZERO,
            unclamped_view_origin: Vec2::ZERO,
            velocity: Vec2::ZERO,
            is_tracking: false,
            config,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Area of the canvas to scroll around in
    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Resize the canvas; hosts call this every frame with their content size
    pub fn set_canvas_size(&mut self, size: Size) {
        self.canvas_rect.size = size;
    }

    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Currently visible area, in canvas coordinates
    pub fn view_rect(&self) -> Rect {
        self.view_rect
    }

    /// Move or resize the view directly
    pub fn set_view_rect(&mut self, rect: Rect) {
        self.view_rect = rect;
        self.view_origin = rect.origin;
        self.unclamped_view_origin = rect.origin;
    }

    /// The clamped scroll offset (sub-pixel)
    pub fn view_origin(&self) -> Vec2 {
        self.view_origin
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// True while a drag is in progress
    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    /// Canvas rect grown to be at least as large as the view
    pub fn full_canvas_rect(&self) -> Rect {
        let mut rect = self.canvas_rect;
        rect.size.width = rect.size.width.max(self.view_rect.size.width);
        rect.size.height = rect.size.height.max(self.view_rect.size.height);
        rect
    }

    /// True while dragging, flicking, or springing back from an edge
    pub fn is_moving(&self) -> bool {
        self.is_tracking
            || !self.velocity.is_zero()
            || !self.full_canvas_rect().contains_rect(&self.view_rect)
    }

    /// Feed one frame of input
    ///
    /// Tracking starts on the first raw `Pressed` touch, because gesture data
    /// only arrives after the finger has moved. Only `Pressed` samples count:
    /// the touch panel may still report samples a frame after a flick or a
    /// drag-complete.
    ///
    /// Flick velocity is taken as `-delta`: a finger flicked upward
    /// (negative y) scrolls the content forward. Hosts whose recognizer uses
    /// the opposite axis convention must negate deltas before building the
    /// `InputState`.
    pub fn handle_input(&mut self, input: &InputState) {
        if !self.is_tracking && input.has_new_touch() {
            self.velocity = Vec2::ZERO;
            self.unclamped_view_origin = self.view_origin;
            self.is_tracking = true;
            tracing::trace!(origin = ?self.view_origin, "scroll tracking started");
        }

        for gesture in &input.gestures {
            match gesture.kind {
                GestureKind::VerticalDrag => {
                    self.unclamped_view_origin.y -= gesture.delta.y;
                }
                GestureKind::Flick => {
                    // Only mostly-vertical flicks
                    if gesture.delta.x.abs() < gesture.delta.y.abs() {
                        self.is_tracking = false;
                        self.velocity = -gesture.delta;
                        tracing::trace!(velocity = ?self.velocity, "scroll flick");
                    }
                }
                GestureKind::DragComplete => {
                    self.is_tracking = false;
                }
                GestureKind::Tap | GestureKind::HorizontalDrag => {}
            }
        }
    }

    /// Advance by one frame
    pub fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();

        let view_min = Vec2::ZERO;
        let view_max = Vec2::new(
            self.canvas_rect.width() - self.view_rect.width(),
            self.canvas_rect.height() - self.view_rect.height(),
        )
        .max(view_min);

        if self.is_tracking {
            self.view_origin.x = soft_clamp(
                self.unclamped_view_origin.x,
                view_min.x,
                view_max.x,
                &self.config,
            );
            self.view_origin.y = soft_clamp(
                self.unclamped_view_origin.y,
                view_min.y,
                view_max.y,
                &self.config,
            );
        } else {
            apply_velocity(
                dt,
                &mut self.view_origin.x,
                &mut self.velocity.x,
                view_min.x,
                view_max.x,
                &self.config,
            );
            apply_velocity(
                dt,
                &mut self.view_origin.y,
                &mut self.velocity.y,
                view_min.y,
                view_max.y,
                &self.config,
            );
        }

        self.view_rect.origin = self.view_origin.trunc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdx_core::input::{Gesture, TouchPhase, TouchSample};

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn press() -> InputState {
        InputState::new().with_touch(TouchSample::new(0, Vec2::new(240.0, 400.0), TouchPhase::Pressed))
    }

    fn tall_tracker() -> ScrollTracker {
        let mut tracker = ScrollTracker::new(Size::new(480.0, 800.0));
        tracker.set_canvas_size(Size::new(480.0, 2000.0));
        tracker
    }

    #[test]
    fn test_soft_clamp_identity_inside_range() {
        let config = ScrollConfig::default();
        for x in [0.0, 0.5, 100.0, 599.9, 1200.0] {
            assert_eq!(soft_clamp(x, 0.0, 1200.0, &config), x);
        }
    }

    #[test]
    fn test_soft_clamp_bounded() {
        let config = ScrollConfig::default();
        let (min, max) = (0.0, 1200.0);
        let mut x = -100_000.0;
        while x < 100_000.0 {
            let clamped = soft_clamp(x, min, max, &config);
            assert!(clamped >= min - config.spring_max_offset - 1e-3, "x={x} -> {clamped}");
            assert!(clamped <= max + config.spring_max_offset + 1e-3, "x={x} -> {clamped}");
            x += 37.5;
        }
    }

    #[test]
    fn test_soft_clamp_compresses_overdrag() {
        let config = ScrollConfig::default();
        let clamped = soft_clamp(-300.0, 0.0, 1200.0, &config);
        assert!((clamped - -100.0).abs() < 0.05, "got {clamped}");

        // Beyond the max drag nothing more happens
        let far = soft_clamp(-5000.0, 0.0, 1200.0, &config);
        let limit = soft_clamp(-400.0, 0.0, 1200.0, &config);
        assert_eq!(far, limit);

        let above = soft_clamp(1500.0, 0.0, 1200.0, &config);
        assert!((above - 1300.0).abs() < 0.05, "got {above}");
    }

    #[test]
    fn test_drag_past_top_scenario() {
        let mut tracker = tall_tracker();
        let input = press().with_gesture(Gesture::vertical_drag(Vec2::new(240.0, 100.0), 300.0));

        tracker.handle_input(&input);
        assert!(tracker.is_tracking());

        tracker.update(FRAME);
        let y = tracker.view_origin().y;
        assert!((y - -100.0).abs() < 0.05, "got {y}");
        let rect_y = tracker.view_rect().y();
        assert!((-100.0..=-99.0).contains(&rect_y), "got {rect_y}");
        assert!(tracker.is_moving());
    }

    #[test]
    fn test_drag_within_range_is_direct() {
        let mut tracker = tall_tracker();
        tracker.handle_input(&press().with_gesture(Gesture::vertical_drag(Vec2::ZERO, -250.0)));
        tracker.update(FRAME);
        assert_eq!(tracker.view_origin().y, 250.0);

        // Drag continues next frame without a new press
        tracker.handle_input(&InputState::new().with_gesture(Gesture::vertical_drag(Vec2::ZERO, -50.0)));
        tracker.update(FRAME);
        assert_eq!(tracker.view_origin().y, 300.0);
    }

    #[test]
    fn test_new_touch_resets_velocity_and_snapshots_origin() {
        let mut tracker = tall_tracker();
        tracker.handle_input(&InputState::new().with_gesture(Gesture::flick(Vec2::new(0.0, -900.0))));
        assert_eq!(tracker.velocity(), Vec2::new(0.0, 900.0));
        tracker.update(FRAME);
        let origin = tracker.view_origin();
        assert!(origin.y > 0.0);

        tracker.handle_input(&press());
        assert!(tracker.is_tracking());
        assert_eq!(tracker.velocity(), Vec2::ZERO);
        tracker.update(FRAME);
        assert_eq!(tracker.view_origin(), origin);
    }

    #[test]
    fn test_horizontal_flick_ignored() {
        let mut tracker = tall_tracker();
        tracker.handle_input(&press());
        tracker.handle_input(&InputState::new().with_gesture(Gesture::flick(Vec2::new(-800.0, 100.0))));
        assert!(tracker.is_tracking());
        assert_eq!(tracker.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_drag_complete_leaves_no_velocity() {
        let mut tracker = tall_tracker();
        tracker.handle_input(
            &press()
                .with_gesture(Gesture::vertical_drag(Vec2::ZERO, -120.0))
                .with_gesture(Gesture::drag_complete()),
        );
        assert!(!tracker.is_tracking());
        assert_eq!(tracker.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_velocity_decay_terminates_without_sign_change() {
        let config = ScrollConfig::default();
        let dt = 1.0 / 60.0;
        let (mut x, mut v) = (0.0f32, 2000.0f32);
        let mut ticks = 0;
        while v != 0.0 {
            apply_velocity(dt, &mut x, &mut v, -1.0e9, 1.0e9, &config);
            assert!(v >= 0.0);
            ticks += 1;
            assert!(ticks <= 245, "velocity never settled");
        }
        assert!(ticks >= 238, "settled too early after {ticks} ticks");
    }

    #[test]
    fn test_velocity_capped() {
        let config = ScrollConfig::default();
        let (mut x, mut v) = (0.0f32, -9000.0f32);
        apply_velocity(0.1, &mut x, &mut v, -1.0e9, 1.0e9, &config);
        assert_eq!(x, -900.0);
        assert_eq!(v, -1950.0);
    }

    #[test]
    fn test_spring_return_never_overshoots() {
        let config = ScrollConfig::default();
        let (mut x, mut v) = (1400.0f32, 0.0f32);
        let mut previous = x;
        for _ in 0..200 {
            apply_velocity(1.0 / 60.0, &mut x, &mut v, 0.0, 1200.0, &config);
            assert!(x >= 1200.0);
            assert!(x <= previous);
            previous = x;
        }
        assert_eq!(x, 1200.0);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_release_after_overdrag_springs_back() {
        let mut tracker = tall_tracker();
        tracker.handle_input(&press().with_gesture(Gesture::vertical_drag(Vec2::ZERO, 300.0)));
        tracker.update(FRAME);
        tracker.handle_input(&InputState::new().with_gesture(Gesture::drag_complete()));

        let mut frames = 0;
        while tracker.is_moving() {
            tracker.update(FRAME);
            frames += 1;
            assert!(frames < 200, "spring never settled");
        }
        // Settled once the pixel-truncated view is back inside the canvas
        assert_eq!(tracker.view_rect().y(), 0.0);
        assert!(tracker.view_origin().y.abs() < 1.0);
    }

    #[test]
    fn test_flick_hits_bottom_and_stops() {
        let mut tracker = tall_tracker();
        tracker.handle_input(&InputState::new().with_gesture(Gesture::flick(Vec2::new(0.0, -2000.0))));
        for _ in 0..600 {
            tracker.update(FRAME);
        }
        assert!(!tracker.is_moving());
        assert_eq!(tracker.view_origin().y, 1200.0);
    }

    #[test]
    fn test_small_canvas_disables_scrolling() {
        let mut tracker = ScrollTracker::new(Size::new(480.0, 800.0));
        tracker.set_canvas_size(Size::new(480.0, 300.0));
        tracker.handle_input(&press().with_gesture(Gesture::vertical_drag(Vec2::ZERO, -200.0)));
        tracker.update(FRAME);

        let y = tracker.view_origin().y;
        assert!(y.is_finite());
        assert!(y > 0.0 && y <= tracker.config().spring_max_offset);

        tracker.handle_input(&InputState::new().with_gesture(Gesture::drag_complete()));
        for _ in 0..200 {
            tracker.update(FRAME);
        }
        assert_eq!(tracker.view_origin().y, 0.0);
        assert!(!tracker.is_moving());
    }

    #[test]
    fn test_rigid_config_hard_clamps() {
        let mut tracker = ScrollTracker::with_config(Size::new(480.0, 800.0), ScrollConfig::rigid());
        tracker.set_canvas_size(Size::new(480.0, 2000.0));
        tracker.handle_input(&press().with_gesture(Gesture::vertical_drag(Vec2::ZERO, 300.0)));
        tracker.update(FRAME);
        assert_eq!(tracker.view_origin().y, 0.0);
    }
}
