//! Linear transition stepping
//!
//! A transition position runs from 0 (fully shown) to 1 (fully hidden).
//! Each frame it moves by `elapsed / duration` in the direction of travel,
//! so the visual speed of a fade or slide is independent of frame rate.

use std::time::Duration;

/// Positions this close to the bound in the direction of travel count as
/// having reached it; absorbs float accumulation over many small steps.
pub const SNAP_EPSILON: f32 = 1.0e-4;

/// Direction of travel for a transition position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    /// Toward 0 (becoming visible)
    On,
    /// Toward 1 (becoming hidden)
    Off,
}

impl TransitionDirection {
    pub fn sign(self) -> f32 {
        match self {
            TransitionDirection::On => -1.0,
            TransitionDirection::Off => 1.0,
        }
    }

    /// The bound this direction moves toward
    pub fn target(self) -> f32 {
        match self {
            TransitionDirection::On => 0.0,
            TransitionDirection::Off => 1.0,
        }
    }
}

/// Result of advancing a transition by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStep {
    pub position: f32,
    /// False once the target bound has been reached
    pub in_progress: bool,
}

/// Advance `position` toward the bound of `direction`
///
/// A zero `duration` completes in a single step.
pub fn advance_transition(
    position: f32,
    elapsed: Duration,
    duration: Duration,
    direction: TransitionDirection,
) -> TransitionStep {
    let delta = if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f64() / duration.as_secs_f64()) as f32
    };

    let position = position + delta * direction.sign();

    let reached = match direction {
        TransitionDirection::On => position <= SNAP_EPSILON,
        TransitionDirection::Off => position >= 1.0 - SNAP_EPSILON,
    };

    if reached {
        TransitionStep {
            position: direction.target(),
            in_progress: false,
        }
    } else {
        TransitionStep {
            position: position.clamp(0.0, 1.0),
            in_progress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks_to_finish(
        start: f32,
        elapsed: Duration,
        duration: Duration,
        direction: TransitionDirection,
    ) -> (u32, Vec<f32>) {
        let mut position = start;
        let mut trace = vec![position];
        let mut ticks = 0;
        loop {
            let step = advance_transition(position, elapsed, duration, direction);
            position = step.position;
            trace.push(position);
            ticks += 1;
            if !step.in_progress {
                return (ticks, trace);
            }
            assert!(ticks < 10_000);
        }
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let step = advance_transition(
            1.0,
            Duration::from_millis(16),
            Duration::ZERO,
            TransitionDirection::On,
        );
        assert_eq!(step.position, 0.0);
        assert!(!step.in_progress);
    }

    #[test]
    fn test_five_ticks_of_a_tenth() {
        let (ticks, trace) = ticks_to_finish(
            1.0,
            Duration::from_millis(100),
            Duration::from_millis(500),
            TransitionDirection::On,
        );
        assert_eq!(ticks, 5);
        assert_eq!(*trace.last().unwrap(), 0.0);
    }

    #[test]
    fn test_monotonic_and_bounded_tick_count() {
        let cases = [(300u64, 16u64), (500, 33), (250, 7), (1000, 100), (500, 17)];
        for (duration_ms, elapsed_ms) in cases {
            for direction in [TransitionDirection::On, TransitionDirection::Off] {
                let start = 1.0 - direction.target();
                let (ticks, trace) = ticks_to_finish(
                    start,
                    Duration::from_millis(elapsed_ms),
                    Duration::from_millis(duration_ms),
                    direction,
                );
                let expected = (duration_ms as f64 / elapsed_ms as f64).ceil() as u32;
                assert_eq!(ticks, expected, "{duration_ms}ms / {elapsed_ms}ms");
                assert_eq!(*trace.last().unwrap(), direction.target());
                for pair in trace.windows(2) {
                    match direction {
                        TransitionDirection::On => assert!(pair[1] <= pair[0]),
                        TransitionDirection::Off => assert!(pair[1] >= pair[0]),
                    }
                }
            }
        }
    }

    #[test]
    fn test_reversal_is_continuous() {
        let elapsed = Duration::from_millis(16);
        let duration = Duration::from_millis(400);
        let max_delta = 16.0 / 400.0 + 1.0e-6;

        let mut position = 1.0;
        for _ in 0..10 {
            position = advance_transition(position, elapsed, duration, TransitionDirection::On).position;
        }
        let before = position;
        let after = advance_transition(position, elapsed, duration, TransitionDirection::Off).position;
        assert!((after - before).abs() <= max_delta);
        assert!(after > before);
    }

    #[test]
    fn test_already_at_target_finishes_immediately() {
        let step = advance_transition(
            0.0,
            Duration::from_millis(16),
            Duration::from_millis(500),
            TransitionDirection::On,
        );
        assert_eq!(step.position, 0.0);
        assert!(!step.in_progress);
    }
}
