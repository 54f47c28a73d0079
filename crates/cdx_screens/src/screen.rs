//! The screen capability trait and the per-frame screen context
//!
//! Screens never hold a reference back to their manager. Anything a screen
//! wants to do to the stack (push another screen, exit, remove one) is
//! queued on the [`ScreenContext`] it is handed, and the manager applies the
//! queue as soon as that screen's turn in the frame is over. Things the host
//! game should react to are reported as [`ScreenEvent`]s.

use std::io::{Read, Write};
use std::time::Duration;

use cdx_core::{DrawContext, GestureSet, InputState};
use cdx_layout::ControlEvent;
use smallvec::SmallVec;

use crate::error::Result;
use crate::manager::ScreenId;
use crate::transition::ScreenTransition;

/// One layer of the screen stack
pub trait Screen {
    /// Stable name used to recreate this screen from saved state
    fn type_name(&self) -> &'static str;

    fn transition(&self) -> &ScreenTransition;

    fn transition_mut(&mut self) -> &mut ScreenTransition;

    /// Gestures the recognizer should report while this screen is on top
    fn enabled_gestures(&self) -> GestureSet {
        GestureSet::NONE
    }

    /// Whether this screen is written out by `ScreenManager::serialize_state`
    fn is_serializable(&self) -> bool {
        true
    }

    /// Called once each time the screen becomes Active
    fn on_activate(&mut self, _ctx: &mut ScreenContext) {}

    /// Per-frame update; runs for every screen, focused or not, before its
    /// transition advances
    fn update(&mut self, _elapsed: Duration, _ctx: &mut ScreenContext) {}

    /// Input for the focused screen only
    fn handle_input(&mut self, _input: &mut InputState, _ctx: &mut ScreenContext) {}

    fn draw(&self, _ctx: &mut DrawContext<'_>) {}

    /// Write whatever state should survive the process being stopped
    fn serialize(&self, _writer: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    /// Restore state written by [`serialize`](Self::serialize)
    fn deserialize(&mut self, _reader: &mut dyn Read) -> Result<()> {
        Ok(())
    }
}

/// A stack change requested by a screen
pub enum ScreenCommand {
    Push(Box<dyn Screen>),
    Exit(ScreenId),
    Remove(ScreenId),
}

impl std::fmt::Debug for ScreenCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenCommand::Push(screen) => f.debug_tuple("Push").field(&screen.type_name()).finish(),
            ScreenCommand::Exit(id) => f.debug_tuple("Exit").field(id).finish(),
            ScreenCommand::Remove(id) => f.debug_tuple("Remove").field(id).finish(),
        }
    }
}

/// Something a screen reports to the host game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenEvent {
    /// A menu entry was tapped
    MenuEntrySelected(usize),
    /// The back button cancelled the screen
    Cancelled,
    /// A control inside the screen reported something
    Control(ControlEvent),
}

/// Handed to a screen for the duration of one callback
#[derive(Debug)]
pub struct ScreenContext {
    id: ScreenId,
    total_time: Duration,
    pub(crate) commands: SmallVec<[ScreenCommand; 2]>,
    pub(crate) events: SmallVec<[ScreenEvent; 2]>,
}

impl ScreenContext {
    pub fn new(id: ScreenId, total_time: Duration) -> Self {
        Self {
            id,
            total_time,
            commands: SmallVec::new(),
            events: SmallVec::new(),
        }
    }

    /// The screen being called
    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Time since the manager started
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Push a new screen on top of the stack
    pub fn push_screen(&mut self, screen: Box<dyn Screen>) {
        self.commands.push(ScreenCommand::Push(screen));
    }

    /// Start this screen's exit transition
    pub fn exit(&mut self) {
        self.commands.push(ScreenCommand::Exit(self.id));
    }

    pub fn exit_screen(&mut self, id: ScreenId) {
        self.commands.push(ScreenCommand::Exit(id));
    }

    /// Remove a screen immediately, skipping its exit transition
    pub fn remove_screen(&mut self, id: ScreenId) {
        self.commands.push(ScreenCommand::Remove(id));
    }

    pub fn emit(&mut self, event: ScreenEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ScreenEvent] {
        &self.events
    }

    pub fn commands(&self) -> &[ScreenCommand] {
        &self.commands
    }
}
