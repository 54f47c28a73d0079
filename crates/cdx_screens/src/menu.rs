//! Menu screen: a title over a column of tappable text entries
//!
//! Entries slide in from the left while the screen transitions on and out
//! to the right while it transitions off. A tap anywhere in an entry's row,
//! across the full viewport width, selects it.

use std::io::{Read, Write};
use std::rc::Rc;
use std::time::Duration;

use cdx_animation::Easing;
use cdx_core::{Color, DrawContext, FontId, GestureKind, GestureSet, InputState, Rect, Size, TextMeasurer, Vec2};
use tracing::debug;

use crate::error::Result;
use crate::screen::{Screen, ScreenContext, ScreenEvent};
use crate::transition::{ScreenState, ScreenTransition};

/// Vertical padding above and below each entry's text, part of its hit area
pub const ENTRY_PADDING: f32 = 10.0;

/// Anchor height of the first entry
pub const FIRST_ENTRY_Y: f32 = 175.0;
const TITLE_Y: f32 = 80.0;
const TITLE_SCALE: f32 = 1.25;
const SLIDE_ON: f32 = 256.0;
const SLIDE_OFF: f32 = 512.0;
/// Selection fade lost per second
const FADE_SPEED: f32 = 4.0;
const MENU_TRANSITION: Duration = Duration::from_millis(500);

/// One line of a menu
#[derive(Clone, Debug, PartialEq)]
pub struct MenuEntry {
    text: String,
    toggle: Option<Toggle>,
    selection_fade: f32,
}

#[derive(Clone, Debug, PartialEq)]
struct Toggle {
    option: String,
    value: bool,
}

impl Toggle {
    fn label(&self) -> String {
        format!("{}: {}", self.option, if self.value { "On" } else { "Off" })
    }
}

impl MenuEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            toggle: None,
            selection_fade: 0.0,
        }
    }

    /// An entry that flips a boolean option each time it is selected
    ///
    /// Its text reads `"<option>: On"` or `"<option>: Off"`.
    pub fn toggle(option: impl Into<String>, value: bool) -> Self {
        let toggle = Toggle {
            option: option.into(),
            value,
        };
        Self {
            text: toggle.label(),
            toggle: Some(toggle),
            selection_fade: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// The toggle value, if this is a toggle entry
    pub fn value(&self) -> Option<bool> {
        self.toggle.as_ref().map(|t| t.value)
    }

    pub fn set_value(&mut self, value: bool) {
        if let Some(toggle) = &mut self.toggle {
            toggle.value = value;
            self.text = toggle.label();
        }
    }

    /// 1 right after a selection, fading to 0
    pub fn selection_fade(&self) -> f32 {
        self.selection_fade
    }

    fn select(&mut self) {
        self.selection_fade = 1.0;
        if let Some(value) = self.value() {
            self.set_value(!value);
        }
    }

    fn update(&mut self, elapsed: Duration) {
        self.selection_fade = (self.selection_fade - elapsed.as_secs_f32() * FADE_SPEED).max(0.0);
    }
}

pub struct MenuScreen {
    title: String,
    entries: Vec<MenuEntry>,
    transition: ScreenTransition,
    viewport: Size,
    font: FontId,
    measurer: Rc<dyn TextMeasurer>,
    type_name: &'static str,
}

impl MenuScreen {
    pub fn new(title: impl Into<String>, viewport: Size, font: FontId, measurer: Rc<dyn TextMeasurer>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            transition: ScreenTransition::symmetric(MENU_TRANSITION),
            viewport,
            font,
            measurer,
            type_name: "menu",
        }
    }

    pub fn with_entry(mut self, entry: MenuEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Name recorded in saved state; give each distinct menu its own
    pub fn with_type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    pub fn with_transition_times(mut self, on_time: Duration, off_time: Duration) -> Self {
        self.transition.set_times(on_time, off_time);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn add_entry(&mut self, entry: MenuEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut MenuEntry> {
        self.entries.get_mut(index)
    }

    fn entry_height(&self) -> f32 {
        self.measurer.line_spacing(self.font)
    }

    /// Where each entry's text is anchored this frame
    pub fn entry_positions(&self) -> Vec<Vec2> {
        let slide = Easing::EaseInQuad.apply(self.transition.position());
        let step = self.entry_height() + ENTRY_PADDING * 2.0;

        let mut y = FIRST_ENTRY_Y;
        self.entries
            .iter()
            .map(|entry| {
                let width = self.measurer.measure(self.font, &entry.text).x.trunc();
                let mut x = (self.viewport.width / 2.0 - width / 2.0).trunc();
                if self.transition.state() == ScreenState::TransitionOn {
                    x -= slide * SLIDE_ON;
                } else {
                    x += slide * SLIDE_OFF;
                }
                let position = Vec2::new(x, y);
                y += step;
                position
            })
            .collect()
    }

    /// The tappable row for an entry anchored at `position`
    pub fn entry_hit_bounds(&self, position: Vec2) -> Rect {
        Rect::new(
            0.0,
            position.y.trunc() - ENTRY_PADDING,
            self.viewport.width,
            self.entry_height() + ENTRY_PADDING * 2.0,
        )
    }
}

impl Screen for MenuScreen {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn transition(&self) -> &ScreenTransition {
        &self.transition
    }

    fn transition_mut(&mut self) -> &mut ScreenTransition {
        &mut self.transition
    }

    fn enabled_gestures(&self) -> GestureSet {
        GestureSet::TAP
    }

    fn update(&mut self, elapsed: Duration, _ctx: &mut ScreenContext) {
        for entry in &mut self.entries {
            entry.update(elapsed);
        }
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut ScreenContext) {
        if input.back_pressed {
            ctx.emit(ScreenEvent::Cancelled);
            ctx.exit();
            return;
        }

        let positions = self.entry_positions();
        for gesture in input.gestures.iter().filter(|g| g.kind == GestureKind::Tap) {
            let hit = positions
                .iter()
                .position(|&p| self.entry_hit_bounds(p).contains(gesture.position));
            if let Some(index) = hit {
                self.entries[index].select();
                debug!(menu = %self.title, entry = index, "menu entry selected");
                ctx.emit(ScreenEvent::MenuEntrySelected(index));
            }
        }
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) {
        let pulse = (ctx.total_time.as_secs_f32() * 6.0).sin() + 1.0;
        let half_line = self.entry_height() / 2.0;

        for (entry, position) in self.entries.iter().zip(self.entry_positions()) {
            let scale = 1.0 + pulse * 0.05 * entry.selection_fade;
            ctx.sink.draw_text(
                self.font,
                &entry.text,
                ctx.offset + position - Vec2::new(0.0, half_line * scale),
                Color::WHITE.faded(ctx.alpha),
                scale,
            );
        }

        let slide = Easing::EaseInQuad.apply(self.transition.position());
        let anchor = Vec2::new(self.viewport.width / 2.0, TITLE_Y - slide * 100.0);
        let origin = self.measurer.measure(self.font, &self.title) * (0.5 * TITLE_SCALE);
        ctx.sink.draw_text(
            self.font,
            &self.title,
            ctx.offset + anchor - origin,
            Color::rgb8(192, 192, 192).faded(ctx.alpha),
            TITLE_SCALE,
        );
    }

    fn serialize(&self, writer: &mut dyn Write) -> Result<()> {
        let values: Vec<Option<bool>> = self.entries.iter().map(MenuEntry::value).collect();
        serde_json::to_writer(writer, &values)?;
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut dyn Read) -> Result<()> {
        let values: Vec<Option<bool>> = serde_json::from_reader(reader)?;
        for (entry, value) in self.entries.iter_mut().zip(values) {
            if let Some(value) = value {
                entry.set_value(value);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MenuScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuScreen")
            .field("title", &self.title)
            .field("entries", &self.entries)
            .field("transition", &self.transition)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdx_core::{Gesture, MonospaceMeasurer, RecordingSink};

    fn menu() -> MenuScreen {
        MenuScreen::new(
            "Main",
            Size::new(480.0, 800.0),
            FontId(0),
            Rc::new(MonospaceMeasurer::new(10.0, 20.0)),
        )
        .with_entry(MenuEntry::new("Play"))
        .with_entry(MenuEntry::toggle("Sound", true))
        .with_transition_times(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_toggle_label() {
        let mut entry = MenuEntry::toggle("Sound", false);
        assert_eq!(entry.text(), "Sound: Off");
        entry.select();
        assert_eq!(entry.text(), "Sound: On");
        assert_eq!(entry.value(), Some(true));
        assert_eq!(entry.selection_fade(), 1.0);
    }

    #[test]
    fn test_selection_fade_decays() {
        let mut entry = MenuEntry::new("Play");
        entry.select();
        entry.update(Duration::from_millis(125));
        assert!((entry.selection_fade() - 0.5).abs() < 1e-5);
        entry.update(Duration::from_secs(1));
        assert_eq!(entry.selection_fade(), 0.0);
    }

    #[test]
    fn test_entry_positions_when_shown() {
        let mut shown = menu();
        shown.transition_mut().update(Duration::from_millis(16), false, false);
        assert_eq!(shown.transition().state(), ScreenState::Active);
        let positions = shown.entry_positions();
        // "Play" is 40 wide, "Sound: On" 90 wide, each row is 20 + 2 * 10
        assert_eq!(positions, vec![Vec2::new(220.0, 175.0), Vec2::new(195.0, 215.0)]);
        assert_eq!(shown.entry_hit_bounds(positions[1]), Rect::new(0.0, 205.0, 480.0, 40.0));
    }

    #[test]
    fn test_entries_slide_in_from_left() {
        let menu = MenuScreen::new(
            "Main",
            Size::new(480.0, 800.0),
            FontId(0),
            Rc::new(MonospaceMeasurer::new(10.0, 20.0)),
        )
        .with_entry(MenuEntry::new("Play"));
        // Fully hidden, transitioning on
        assert_eq!(menu.entry_positions(), vec![Vec2::new(220.0 - 256.0, 175.0)]);
    }

    #[test]
    fn test_tap_selects_entry() {
        let mut screen = menu();
        screen.transition_mut().update(Duration::from_millis(16), false, false);

        let mut ctx = ScreenContext::new(Default::default(), Duration::ZERO);
        let mut input = InputState::new().with_gesture(Gesture::tap(Vec2::new(10.0, 230.0)));
        screen.handle_input(&mut input, &mut ctx);

        assert_eq!(ctx.events(), &[ScreenEvent::MenuEntrySelected(1)]);
        assert_eq!(screen.entries()[1].text(), "Sound: Off");
        // Gestures stay in the queue for anything else listening
        assert_eq!(input.gestures.len(), 1);
    }

    #[test]
    fn test_tap_on_shared_row_edge_selects_lower_entry() {
        let mut screen = menu();
        screen.transition_mut().update(Duration::from_millis(16), false, false);

        // Row 0 ends and row 1 starts at y = 205
        let mut ctx = ScreenContext::new(Default::default(), Duration::ZERO);
        let mut input = InputState::new().with_gesture(Gesture::tap(Vec2::new(10.0, 205.0)));
        screen.handle_input(&mut input, &mut ctx);

        assert_eq!(ctx.events(), &[ScreenEvent::MenuEntrySelected(1)]);
    }

    #[test]
    fn test_back_cancels_and_exits() {
        let mut screen = menu();
        let mut ctx = ScreenContext::new(Default::default(), Duration::ZERO);
        screen.handle_input(&mut InputState::new().with_back(), &mut ctx);
        assert_eq!(ctx.events(), &[ScreenEvent::Cancelled]);
        assert_eq!(ctx.commands().len(), 1);
    }

    #[test]
    fn test_draw_fades_with_alpha() {
        let mut screen = menu();
        screen.transition_mut().update(Duration::from_millis(16), false, false);

        let mut sink = RecordingSink::new();
        screen.draw(&mut DrawContext::new(&mut sink).with_alpha(0.5));
        assert_eq!(sink.text_position("Play"), Some(Vec2::new(220.0, 165.0)));
        // Title: centred at (240, 80), 40x20 scaled by 1.25
        assert_eq!(sink.text_position("Main"), Some(Vec2::new(215.0, 67.5)));
        assert!(sink.commands.iter().all(|c| match c {
            cdx_core::DrawCommand::Text { color, .. } => color.a <= 0.5,
            _ => true,
        }));
    }

    #[test]
    fn test_toggle_values_round_trip() {
        let mut screen = menu();
        screen.entry_mut(1).unwrap().set_value(false);
        let mut data = Vec::new();
        screen.serialize(&mut data).unwrap();

        let mut restored = menu();
        restored.deserialize(&mut data.as_slice()).unwrap();
        assert_eq!(restored.entries()[1].value(), Some(false));
        assert_eq!(restored.entries()[1].text(), "Sound: Off");
    }
}
