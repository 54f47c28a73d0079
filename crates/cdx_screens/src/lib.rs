//! Cdx Screens
//!
//! A stack of full-screen layers for touch games:
//!
//! - **Transitions**: every screen fades and slides on and off through the
//!   `ScreenTransition` state machine
//! - **Focus**: the topmost showing screen gets the frame's input; non-popup
//!   screens cover the ones beneath them
//! - **Persistence**: the stack can be written out when the game is stopped
//!   and rebuilt through a `ScreenRegistry`
//! - **Sample screens**: a menu, a control-hosting screen, and a scrolling
//!   high-score table
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use cdx_core::{FontId, Gesture, InputState, MonospaceMeasurer, Size, Vec2};
//! use cdx_screens::{MenuEntry, MenuScreen, ScreenEvent, ScreenManager, ScreenState};
//!
//! let menu = MenuScreen::new(
//!     "Main menu",
//!     Size::new(480.0, 800.0),
//!     FontId(0),
//!     Rc::new(MonospaceMeasurer::default()),
//! )
//! .with_entry(MenuEntry::new("Play"))
//! .with_entry(MenuEntry::new("Quit"));
//!
//! let mut manager = ScreenManager::new();
//! let id = manager.add_screen(Box::new(menu));
//!
//! // Half a second to transition on
//! let frame = Duration::from_millis(100);
//! for _ in 0..5 {
//!     manager.update(frame, &mut InputState::new(), true);
//! }
//! assert_eq!(manager.screen(id).unwrap().transition().state(), ScreenState::Active);
//!
//! // "Quit" is the second row, 40px below the first at y = 175
//! let mut input = InputState::new().with_gesture(Gesture::tap(Vec2::new(240.0, 215.0)));
//! let report = manager.update(frame, &mut input, true);
//! assert_eq!(report.events, vec![(id, ScreenEvent::MenuEntrySelected(1))]);
//! ```

pub mod control_screen;
pub mod error;
pub mod frame_rate;
pub mod high_scores;
pub mod manager;
pub mod menu;
pub mod screen;
pub mod transition;

pub use control_screen::ControlScreen;
pub use error::{Result, ScreenError};
pub use frame_rate::FrameRateCounter;
pub use high_scores::{
    high_score_panel, high_score_screen, HighScoreEntry, HighScoreFonts, HighScoreTable, HighScores,
};
pub use manager::{FrameReport, ScreenId, ScreenManager, ScreenRegistry};
pub use menu::{MenuEntry, MenuScreen, ENTRY_PADDING, FIRST_ENTRY_Y};
pub use screen::{Screen, ScreenCommand, ScreenContext, ScreenEvent};
pub use transition::{ScreenState, ScreenTransition, TransitionOutcome};
