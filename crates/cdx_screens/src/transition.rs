//! Screen transition state machine
//!
//! Every screen carries a [`ScreenTransition`]. Each frame the manager tells
//! it whether another screen already has focus and whether a non-popup
//! screen above covers it; the transition then moves its position toward
//! shown or hidden and derives the state from where it ended up.
//!
//! ```text
//!            covered                       done
//!   Active ───────────▶ TransitionOff ───────────▶ Hidden
//!     ▲                    │     ▲                   │
//!     │ done     uncovered │     │ covered           │ uncovered
//!     │                    ▼     │                   │
//!   TransitionOn ◀─────────┴─────┴───────────────────┘
//! ```
//!
//! An exiting screen always travels toward hidden and is removed from the
//! stack once it gets there.

use std::time::Duration;

use cdx_animation::{advance_transition, TransitionDirection};
use tracing::trace;

/// Where a screen is in its show/hide cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScreenState {
    #[default]
    TransitionOn,
    Active,
    TransitionOff,
    Hidden,
}

impl ScreenState {
    /// States in which a screen takes part in focus and covering
    pub fn is_showing(self) -> bool {
        matches!(self, ScreenState::TransitionOn | ScreenState::Active)
    }
}

/// What the manager should do after a transition update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Nothing special happened
    Running,
    /// The screen became Active this frame
    EnteredActive,
    /// An exiting screen finished hiding and must be removed
    Remove,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenTransition {
    state: ScreenState,
    position: f32,
    on_time: Duration,
    off_time: Duration,
    is_exiting: bool,
    is_popup: bool,
    other_screen_has_focus: bool,
}

impl ScreenTransition {
    /// A transition that starts fully hidden and transitioning on
    pub fn new(on_time: Duration, off_time: Duration) -> Self {
        Self {
            state: ScreenState::TransitionOn,
            position: 1.0,
            on_time,
            off_time,
            is_exiting: false,
            is_popup: false,
            other_screen_has_focus: false,
        }
    }

    /// Both transitions take `time`
    pub fn symmetric(time: Duration) -> Self {
        Self::new(time, time)
    }

    /// Mark as a popup: it never covers the screens beneath it
    pub fn popup(mut self) -> Self {
        self.is_popup = true;
        self
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// 0 when fully shown, 1 when fully hidden
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Opacity for drawing, `1 - position`
    pub fn alpha(&self) -> f32 {
        1.0 - self.position
    }

    pub fn on_time(&self) -> Duration {
        self.on_time
    }

    pub fn off_time(&self) -> Duration {
        self.off_time
    }

    pub fn set_times(&mut self, on_time: Duration, off_time: Duration) {
        self.on_time = on_time;
        self.off_time = off_time;
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub(crate) fn set_exiting(&mut self, exiting: bool) {
        self.is_exiting = exiting;
    }

    pub fn is_popup(&self) -> bool {
        self.is_popup
    }

    pub fn set_popup(&mut self, popup: bool) {
        self.is_popup = popup;
    }

    /// True when this screen should respond to input: nothing above it has
    /// focus and it is transitioning on or fully active
    pub fn is_active(&self) -> bool {
        !self.other_screen_has_focus && self.state.is_showing()
    }

    /// Advance one frame
    pub fn update(
        &mut self,
        elapsed: Duration,
        other_screen_has_focus: bool,
        covered_by_other_screen: bool,
    ) -> TransitionOutcome {
        self.other_screen_has_focus = other_screen_has_focus;
        let previous = self.state;

        if self.is_exiting {
            self.state = ScreenState::TransitionOff;
            if !self.step(elapsed, self.off_time, TransitionDirection::Off) {
                trace!("exit transition finished");
                return TransitionOutcome::Remove;
            }
        } else if covered_by_other_screen {
            self.state = if self.step(elapsed, self.off_time, TransitionDirection::Off) {
                ScreenState::TransitionOff
            } else {
                ScreenState::Hidden
            };
        } else {
            self.state = if self.step(elapsed, self.on_time, TransitionDirection::On) {
                ScreenState::TransitionOn
            } else {
                ScreenState::Active
            };
        }

        if self.state != previous {
            trace!(from = ?previous, to = ?self.state, position = self.position, "screen state");
        }
        if self.state == ScreenState::Active && previous != ScreenState::Active {
            TransitionOutcome::EnteredActive
        } else {
            TransitionOutcome::Running
        }
    }

    /// True while still in progress
    fn step(&mut self, elapsed: Duration, duration: Duration, direction: TransitionDirection) -> bool {
        let step = advance_transition(self.position, elapsed, duration, direction);
        self.position = step.position;
        step.in_progress
    }
}

impl Default for ScreenTransition {
    fn default() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}
