//! Per-frame input snapshot
//!
//! The host's gesture recognizer produces discrete gestures; the raw touch
//! panel produces touch samples. Both are collected into one `InputState`
//! per frame and handed to the focused screen.
//!
//! Gestures form a shared queue scoped to the frame: a consumer may remove
//! a gesture (see [`InputState::consume_gesture`]) so that controls visited
//! later never see it.

use smallvec::SmallVec;

use crate::geometry::Vec2;

/// Kind of a recognized gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    VerticalDrag,
    HorizontalDrag,
    Flick,
    DragComplete,
}

impl GestureKind {
    /// The flag that enables this gesture kind in a [`GestureSet`]
    pub const fn flag(self) -> GestureSet {
        match self {
            GestureKind::Tap => GestureSet::TAP,
            GestureKind::VerticalDrag => GestureSet::VERTICAL_DRAG,
            GestureKind::HorizontalDrag => GestureSet::HORIZONTAL_DRAG,
            GestureKind::Flick => GestureSet::FLICK,
            GestureKind::DragComplete => GestureSet::DRAG_COMPLETE,
        }
    }
}

/// A recognized gesture with its position and displacement
///
/// For drags, `delta` is the movement since the previous sample. For
/// flicks, `delta` is the flick velocity in pixels per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub position: Vec2,
    pub delta: Vec2,
}

impl Gesture {
    pub fn tap(position: Vec2) -> Self {
        Self {
            kind: GestureKind::Tap,
            position,
            delta: Vec2::ZERO,
        }
    }

    pub fn vertical_drag(position: Vec2, delta_y: f32) -> Self {
        Self {
            kind: GestureKind::VerticalDrag,
            position,
            delta: Vec2::new(0.0, delta_y),
        }
    }

    pub fn flick(delta: Vec2) -> Self {
        Self {
            kind: GestureKind::Flick,
            position: Vec2::ZERO,
            delta,
        }
    }

    pub fn drag_complete() -> Self {
        Self {
            kind: GestureKind::DragComplete,
            position: Vec2::ZERO,
            delta: Vec2::ZERO,
        }
    }
}

/// Phase of a raw touch point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Pressed,
    Moved,
    Released,
}

/// One raw touch point sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSample {
    pub id: u32,
    pub position: Vec2,
    pub phase: TouchPhase,
}

impl TouchSample {
    pub fn new(id: u32, position: Vec2, phase: TouchPhase) -> Self {
        Self {
            id,
            position,
            phase,
        }
    }
}

/// Set of gesture kinds a screen wants the recognizer to report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GestureSet {
    bits: u8,
}

impl GestureSet {
    pub const NONE: GestureSet = GestureSet { bits: 0 };
    pub const TAP: GestureSet = GestureSet { bits: 0b0_0001 };
    pub const VERTICAL_DRAG: GestureSet = GestureSet { bits: 0b0_0010 };
    pub const HORIZONTAL_DRAG: GestureSet = GestureSet { bits: 0b0_0100 };
    pub const FLICK: GestureSet = GestureSet { bits: 0b0_1000 };
    pub const DRAG_COMPLETE: GestureSet = GestureSet { bits: 0b1_0000 };

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    pub const fn bits(&self) -> u8 {
        self.bits
    }

    pub const fn union(self, other: GestureSet) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub const fn contains(&self, other: GestureSet) -> bool {
        self.bits & other.bits == other.bits
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Check whether a gesture kind is enabled
    pub const fn allows(&self, kind: GestureKind) -> bool {
        self.contains(kind.flag())
    }
}

impl std::ops::BitOr for GestureSet {
    type Output = GestureSet;

    fn bitor(self, rhs: GestureSet) -> GestureSet {
        self.union(rhs)
    }
}

/// Everything the host observed during one frame
#[derive(Clone, Debug, Default)]
pub struct InputState {
    /// Recognized gestures in arrival order
    pub gestures: SmallVec<[Gesture; 4]>,
    /// Raw touch samples, used to detect touch-down before any gesture exists
    pub touches: SmallVec<[TouchSample; 4]>,
    /// Hardware back button went down this frame
    pub back_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gesture(mut self, gesture: Gesture) -> Self {
        self.gestures.push(gesture);
        self
    }

    pub fn with_touch(mut self, touch: TouchSample) -> Self {
        self.touches.push(touch);
        self
    }

    pub fn with_back(mut self) -> Self {
        self.back_pressed = true;
        self
    }

    /// True if any touch point went down this frame
    pub fn has_new_touch(&self) -> bool {
        self.touches.iter().any(|t| t.phase == TouchPhase::Pressed)
    }

    /// Remove the gesture at `index` so no later consumer sees it
    pub fn consume_gesture(&mut self, index: usize) -> Option<Gesture> {
        if index < self.gestures.len() {
            Some(self.gestures.remove(index))
        } else {
            None
        }
    }

    /// Drop gestures the recognizer would not have reported
    pub fn retain_enabled(&mut self, enabled: GestureSet) {
        self.gestures.retain(|g| enabled.allows(g.kind));
    }

    /// Reset for the next frame
    pub fn clear(&mut self) {
        self.gestures.clear();
        self.touches.clear();
        self.back_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_set_flags() {
        let set = GestureSet::FLICK | GestureSet::VERTICAL_DRAG | GestureSet::DRAG_COMPLETE;
        assert!(set.allows(GestureKind::Flick));
        assert!(set.allows(GestureKind::DragComplete));
        assert!(!set.allows(GestureKind::Tap));
        assert!(GestureSet::NONE.is_empty());
    }

    #[test]
    fn test_consume_gesture_hides_it_from_later_consumers() {
        let mut input = InputState::new()
            .with_gesture(Gesture::tap(Vec2::new(10.0, 10.0)))
            .with_gesture(Gesture::drag_complete());

        let consumed = input.consume_gesture(0);
        assert_eq!(consumed.map(|g| g.kind), Some(GestureKind::Tap));
        assert_eq!(input.gestures.len(), 1);
        assert_eq!(input.gestures[0].kind, GestureKind::DragComplete);
        assert!(input.consume_gesture(5).is_none());
    }

    #[test]
    fn test_retain_enabled() {
        let mut input = InputState::new()
            .with_gesture(Gesture::tap(Vec2::ZERO))
            .with_gesture(Gesture::flick(Vec2::new(0.0, -300.0)));
        input.retain_enabled(GestureSet::TAP);
        assert_eq!(input.gestures.len(), 1);
        assert_eq!(input.gestures[0].kind, GestureKind::Tap);
    }

    #[test]
    fn test_new_touch_detection() {
        let input = InputState::new().with_touch(TouchSample::new(
            0,
            Vec2::new(5.0, 5.0),
            TouchPhase::Moved,
        ));
        assert!(!input.has_new_touch());

        let input = input.with_touch(TouchSample::new(1, Vec2::ZERO, TouchPhase::Pressed));
        assert!(input.has_new_touch());
    }
}
