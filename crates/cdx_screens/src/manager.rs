//! Screen stack manager
//!
//! Owns the stack of screens, runs their transitions, routes input to the
//! topmost screen that is showing, and draws everything that is not hidden.
//!
//! # Frame order
//!
//! `update` walks a snapshot of the stack from the top down. Each screen is
//! updated, then its transition advances, then the commands it queued are
//! applied. The first screen found transitioning on or active gets the
//! frame's input; every screen below it then sees `other_screen_has_focus`.
//! A non-popup in one of those states covers every screen below it.
//!
//! Screens pushed during the walk join the stack but not the snapshot, so
//! they are first updated next frame. Screens removed during the walk drop
//! out of the snapshot immediately.

use std::io::{Read, Write};
use std::time::Duration;

use cdx_core::{DrawContext, GestureSet, InputState, RenderSink};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, warn};

use crate::error::{Result, ScreenError};
use crate::screen::{Screen, ScreenCommand, ScreenContext, ScreenEvent};
use crate::transition::{ScreenState, TransitionOutcome};

new_key_type! {
    pub struct ScreenId;
}

/// What happened during one `ScreenManager::update`
#[derive(Debug, Default)]
pub struct FrameReport {
    /// The screen that received this frame's input, if any
    pub focused: Option<ScreenId>,
    /// Events in the order the screens raised them
    pub events: Vec<(ScreenId, ScreenEvent)>,
    /// Screens removed from the stack during the frame
    pub removed: Vec<ScreenId>,
    /// Commands that named a screen this manager does not own
    pub errors: Vec<ScreenError>,
}

impl FrameReport {
    /// Events raised by one screen
    pub fn events_from(&self, id: ScreenId) -> impl Iterator<Item = ScreenEvent> + '_ {
        self.events
            .iter()
            .filter(move |(source, _)| *source == id)
            .map(|(_, event)| *event)
    }
}

type ScreenFactory = Box<dyn Fn() -> Box<dyn Screen>>;

/// Maps saved screen type names back to constructors
#[derive(Default)]
pub struct ScreenRegistry {
    factories: FxHashMap<String, ScreenFactory>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Screen> + 'static,
    {
        self.factories.insert(type_name.to_string(), Box::new(factory));
    }

    pub fn create(&self, type_name: &str) -> Option<Box<dyn Screen>> {
        self.factories.get(type_name).map(|factory| factory())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }
}

#[derive(Serialize, Deserialize)]
struct SavedState {
    screens: Vec<SavedScreen>,
}

#[derive(Serialize, Deserialize)]
struct SavedScreen {
    type_name: String,
    data: Vec<u8>,
}

pub struct ScreenManager {
    screens: SlotMap<ScreenId, Box<dyn Screen>>,
    /// Bottom to top
    stack: Vec<ScreenId>,
    /// Screens still waiting for their update this frame
    pending: Vec<ScreenId>,
    enabled_gestures: GestureSet,
    trace_enabled: bool,
    total_time: Duration,
}

impl ScreenManager {
    pub fn new() -> Self {
        Self {
            screens: SlotMap::with_key(),
            stack: Vec::new(),
            pending: Vec::new(),
            enabled_gestures: GestureSet::NONE,
            trace_enabled: false,
            total_time: Duration::ZERO,
        }
    }

    // =========================================================================
    // Stack
    // =========================================================================

    /// Push a screen on top of the stack and enable the gestures it wants
    pub fn add_screen(&mut self, mut screen: Box<dyn Screen>) -> ScreenId {
        screen.transition_mut().set_exiting(false);
        self.enabled_gestures = screen.enabled_gestures();
        let name = screen.type_name();
        let id = self.screens.insert(screen);
        self.stack.push(id);
        debug!(screen = name, depth = self.stack.len(), "screen added");
        id
    }

    /// Take a screen off the stack immediately
    ///
    /// The new top screen's gestures are enabled.
    pub fn remove_screen(&mut self, id: ScreenId) -> Result<Box<dyn Screen>> {
        let index = self
            .stack
            .iter()
            .position(|&s| s == id)
            .ok_or(ScreenError::NotOwned(id))?;
        self.stack.remove(index);
        self.pending.retain(|&s| s != id);
        let screen = self.screens.remove(id).ok_or(ScreenError::NotOwned(id))?;

        if let Some(top) = self.top().and_then(|top| self.screens.get(top)) {
            self.enabled_gestures = top.enabled_gestures();
        }
        debug!(screen = screen.type_name(), depth = self.stack.len(), "screen removed");
        Ok(screen)
    }

    /// Ask a screen to leave
    ///
    /// With no off transition time the screen is removed on the spot;
    /// otherwise it transitions off and is removed when hidden.
    pub fn exit_screen(&mut self, id: ScreenId) -> Result<()> {
        let screen = self.screens.get_mut(id).ok_or(ScreenError::NotOwned(id))?;
        if screen.transition().off_time().is_zero() {
            self.remove_screen(id).map(|_| ())
        } else {
            screen.transition_mut().set_exiting(true);
            Ok(())
        }
    }

    /// Remove every screen
    pub fn clear(&mut self) {
        self.stack.clear();
        self.pending.clear();
        self.screens.clear();
    }

    /// Screen ids from bottom to top
    pub fn screens(&self) -> &[ScreenId] {
        &self.stack
    }

    pub fn screen(&self, id: ScreenId) -> Option<&dyn Screen> {
        self.screens.get(id).map(|s| s.as_ref())
    }

    pub fn screen_mut(&mut self, id: ScreenId) -> Option<&mut (dyn Screen + 'static)> {
        self.screens.get_mut(id).map(|s| s.as_mut())
    }

    pub fn top(&self) -> Option<ScreenId> {
        self.stack.last().copied()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Gestures the host's recognizer should currently report
    pub fn enabled_gestures(&self) -> GestureSet {
        self.enabled_gestures
    }

    /// Log the stack at debug level after every update
    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Run one frame
    ///
    /// `host_has_focus` is false while the game window itself is in the
    /// background; no screen receives input then. Gestures outside
    /// [`enabled_gestures`](Self::enabled_gestures) are dropped from `input`
    /// first, as the host recognizer would not have reported them.
    pub fn update(
        &mut self,
        elapsed: Duration,
        input: &mut InputState,
        host_has_focus: bool,
    ) -> FrameReport {
        self.total_time += elapsed;
        input.retain_enabled(self.enabled_gestures);

        let mut report = FrameReport::default();
        let mut other_screen_has_focus = !host_has_focus;
        let mut covered_by_other_screen = false;

        self.pending.clone_from(&self.stack);
        while let Some(id) = self.pending.pop() {
            let is_top = self.top() == Some(id);
            let Some(screen) = self.screens.get_mut(id) else {
                continue;
            };
            let mut ctx = ScreenContext::new(id, self.total_time);

            screen.update(elapsed, &mut ctx);
            let outcome = screen.transition_mut().update(
                elapsed,
                other_screen_has_focus,
                covered_by_other_screen,
            );

            match outcome {
                TransitionOutcome::Remove => {
                    self.apply(ctx, &mut report);
                    if self.remove_screen(id).is_ok() {
                        report.removed.push(id);
                    }
                    continue;
                }
                TransitionOutcome::EnteredActive => {
                    screen.on_activate(&mut ctx);
                    if is_top {
                        self.enabled_gestures = screen.enabled_gestures();
                    }
                }
                TransitionOutcome::Running => {}
            }

            if screen.transition().state().is_showing() {
                if !other_screen_has_focus {
                    screen.handle_input(input, &mut ctx);
                    report.focused = Some(id);
                    other_screen_has_focus = true;
                }
                if !screen.transition().is_popup() {
                    covered_by_other_screen = true;
                }
            }

            self.apply(ctx, &mut report);
        }

        if self.trace_enabled {
            let names: Vec<&str> = self
                .stack
                .iter()
                .filter_map(|&id| self.screens.get(id))
                .map(|s| s.type_name())
                .collect();
            debug!(screens = ?names, "screen stack");
        }

        report
    }

    fn apply(&mut self, ctx: ScreenContext, report: &mut FrameReport) {
        let source = ctx.id();
        report
            .events
            .extend(ctx.events.into_iter().map(|event| (source, event)));

        for command in ctx.commands {
            let result = match command {
                ScreenCommand::Push(screen) => {
                    self.add_screen(screen);
                    Ok(())
                }
                ScreenCommand::Exit(id) => {
                    let removed_now = self.screens.get(id).is_some_and(|s| s.transition().off_time().is_zero());
                    let result = self.exit_screen(id);
                    if removed_now && result.is_ok() {
                        report.removed.push(id);
                    }
                    result
                }
                ScreenCommand::Remove(id) => self.remove_screen(id).map(|_| report.removed.push(id)),
            };
            if let Err(error) = result {
                warn!(%error, "screen command failed");
                report.errors.push(error);
            }
        }
    }

    /// Draw every screen that is not hidden, bottom to top
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for &id in &self.stack {
            let Some(screen) = self.screens.get(id) else {
                continue;
            };
            let transition = screen.transition();
            if transition.state() == ScreenState::Hidden {
                continue;
            }
            let mut ctx = DrawContext::new(&mut *sink)
                .with_alpha(transition.alpha())
                .with_total_time(self.total_time);
            screen.draw(&mut ctx);
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the serializable screens, bottom to top, with their own state
    pub fn serialize_state(&self, writer: &mut dyn Write) -> Result<()> {
        let mut saved = SavedState {
            screens: Vec::with_capacity(self.stack.len()),
        };
        for &id in &self.stack {
            let Some(screen) = self.screens.get(id) else {
                continue;
            };
            if !screen.is_serializable() {
                continue;
            }
            let mut data = Vec::new();
            screen.serialize(&mut data)?;
            saved.screens.push(SavedScreen {
                type_name: screen.type_name().to_string(),
                data,
            });
        }
        serde_json::to_writer(writer, &saved)?;
        debug!(screens = saved.screens.len(), "screen state saved");
        Ok(())
    }

    /// Rebuild the stack from saved state
    ///
    /// Returns false, with an empty stack, if the saved state cannot be
    /// read or names a screen type the registry does not know. The error is
    /// logged, never returned: a corrupt save must not stop the game from
    /// starting.
    pub fn deserialize_state(&mut self, reader: &mut dyn Read, registry: &ScreenRegistry) -> bool {
        match Self::restore(reader, registry) {
            Ok(screens) => {
                for screen in screens {
                    self.add_screen(screen);
                }
                true
            }
            Err(error) => {
                warn!(%error, "discarding saved screen state");
                self.clear();
                false
            }
        }
    }

    fn restore(reader: &mut dyn Read, registry: &ScreenRegistry) -> Result<Vec<Box<dyn Screen>>> {
        let saved: SavedState = serde_json::from_reader(reader)?;
        saved
            .screens
            .into_iter()
            .map(|entry| {
                let mut screen = registry
                    .create(&entry.type_name)
                    .ok_or_else(|| ScreenError::UnknownScreenType(entry.type_name.clone()))?;
                screen.deserialize(&mut entry.data.as_slice())?;
                Ok::<_, ScreenError>(screen)
            })
            .collect()
    }
}

impl Default for ScreenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScreenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenManager")
            .field("stack", &self.stack)
            .field("enabled_gestures", &self.enabled_gestures)
            .finish()
    }
}
