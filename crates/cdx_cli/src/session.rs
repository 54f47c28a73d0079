//! Headless run of the sample screens
//!
//! A main menu leads to a scrolling high-score table and an options menu.
//! Input comes from a fixed script keyed by frame number, and drawing goes
//! to a sink that only counts calls.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use cdx_core::{
    Color, FontId, Gesture, InputState, MonospaceMeasurer, Rect, RenderSink, Size, TextMeasurer,
    TextureId, TouchPhase, TouchSample, Vec2,
};
use cdx_screens::{
    high_score_screen, FrameRateCounter, HighScoreFonts, HighScores, MenuEntry, MenuScreen,
    Screen, ScreenEvent, ScreenId, ScreenManager, ScreenRegistry, ENTRY_PADDING, FIRST_ENTRY_Y,
};
use tracing::{debug, info, warn};

use crate::config::CdxConfig;

const FONT: FontId = FontId(0);
const SCORE_TABLE: &str = "normal";
const SCORE_ROWS: usize = 50;

const MAIN_MENU: &str = "main_menu";
const OPTIONS_MENU: &str = "options";

/// Entries of the main menu
const PLAY: usize = 0;
const HIGH_SCORES: usize = 1;
const OPTIONS: usize = 2;
const EXIT: usize = 3;

/// Counts draw calls
#[derive(Debug, Default)]
struct CountingSink {
    batches: u64,
    draws: u64,
}

impl RenderSink for CountingSink {
    fn begin(&mut self) {
        self.batches += 1;
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {
        self.draws += 1;
    }

    fn draw_texture(
        &mut self,
        _texture: Option<TextureId>,
        _dest: Rect,
        _source: Option<Rect>,
        _color: Color,
    ) {
        self.draws += 1;
    }

    fn draw_text(&mut self, _font: FontId, _text: &str, _position: Vec2, _color: Color, _scale: f32) {
        self.draws += 1;
    }
}

/// What a run did
#[derive(Debug, Default)]
pub struct SessionSummary {
    pub frames: u64,
    pub draw_calls: u64,
    pub batches: u64,
    pub events: usize,
    pub screens_opened: usize,
    pub frame_rate: u32,
    pub final_stack: Vec<&'static str>,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames:          {}", self.frames)?;
        writeln!(f, "draw calls:      {}", self.draw_calls)?;
        writeln!(f, "control batches: {}", self.batches)?;
        writeln!(f, "screen events:   {}", self.events)?;
        writeln!(f, "screens opened:  {}", self.screens_opened)?;
        writeln!(f, "last frame rate: {} fps", self.frame_rate)?;
        if self.final_stack.is_empty() {
            write!(f, "final stack:     (empty)")
        } else {
            write!(f, "final stack:     {}", self.final_stack.join(" > "))
        }
    }
}

/// Builds the sample screens with shared settings
#[derive(Clone)]
struct ScreenFactory {
    viewport: Size,
    measurer: Rc<dyn TextMeasurer>,
    on_time: Duration,
    off_time: Duration,
}

impl ScreenFactory {
    fn menu(&self, title: &str, type_name: &'static str) -> MenuScreen {
        MenuScreen::new(title, self.viewport, FONT, Rc::clone(&self.measurer))
            .with_type_name(type_name)
            .with_transition_times(self.on_time, self.off_time)
    }

    fn main_menu(&self) -> Box<dyn Screen> {
        Box::new(
            self.menu("Main menu", MAIN_MENU)
                .with_entry(MenuEntry::new("Play"))
                .with_entry(MenuEntry::new("High scores"))
                .with_entry(MenuEntry::new("Options"))
                .with_entry(MenuEntry::new("Exit")),
        )
    }

    fn options_menu(&self) -> Box<dyn Screen> {
        Box::new(
            self.menu("Options", OPTIONS_MENU)
                .with_entry(MenuEntry::toggle("Sound", true))
                .with_entry(MenuEntry::toggle("Vibration", true)),
        )
    }

    fn registry(&self) -> ScreenRegistry {
        let mut registry = ScreenRegistry::new();
        let main = self.clone();
        registry.register(MAIN_MENU, move || main.main_menu());
        let options = self.clone();
        registry.register(OPTIONS_MENU, move || options.options_menu());
        registry
    }

    /// Where to tap to hit menu entry `index` once the menu is shown
    fn entry_point(&self, index: usize) -> Vec2 {
        let row = self.measurer.line_spacing(FONT) + ENTRY_PADDING * 2.0;
        Vec2::new(self.viewport.width / 2.0, FIRST_ENTRY_Y + row * index as f32)
    }
}

pub struct Session {
    manager: ScreenManager,
    factory: ScreenFactory,
    scores: HighScores,
    fps: FrameRateCounter,
    show_fps: bool,
    config: CdxConfig,
}

impl Session {
    pub fn new(config: CdxConfig) -> Self {
        let factory = ScreenFactory {
            viewport: Size::new(config.display.width, config.display.height),
            measurer: Rc::new(MonospaceMeasurer::default()),
            on_time: config.transitions.menu_on(),
            off_time: config.transitions.menu_off(),
        };
        let mut manager = ScreenManager::new();
        manager.set_trace_enabled(config.debug.trace_screens);

        let mut scores = HighScores::new();
        scores.initialize_table(SCORE_TABLE, SCORE_ROWS, "Normal");

        Self {
            manager,
            factory,
            scores,
            fps: FrameRateCounter::new(),
            show_fps: config.debug.show_fps,
            config,
        }
    }

    /// Restore saved screens and scores, falling back to a fresh start
    pub fn restore(&mut self) -> Result<()> {
        if let Some(path) = self.config.storage.scores_file.as_deref().filter(|p| p.exists()) {
            let mut file = open(path)?;
            if !self.scores.load(&mut file) {
                warn!(path = %path.display(), "high scores reset");
            }
        }
        if self
            .scores
            .table(SCORE_TABLE)
            .is_some_and(|t| t.entries().iter().all(|e| e.is_placeholder()))
        {
            self.seed_scores();
        }

        if let Some(path) = self.config.storage.state_file.as_deref().filter(|p| p.exists()) {
            let mut file = open(path)?;
            let registry = self.factory.registry();
            if self.manager.deserialize_state(&mut file, &registry) {
                info!(screens = self.manager.len(), "restored screen stack");
            }
        }

        if self.manager.is_empty() {
            self.manager.add_screen(self.factory.main_menu());
        }
        Ok(())
    }

    fn seed_scores(&mut self) {
        if let Some(table) = self.scores.table_mut(SCORE_TABLE) {
            for i in 0..SCORE_ROWS {
                table.add_entry(format!("player{i}"), 10_000 - i as i64 * 10, None);
            }
        }
    }

    /// Write the stack and scores to the configured files
    pub fn persist(&self) -> Result<()> {
        if let Some(path) = &self.config.storage.state_file {
            let mut file =
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            self.manager
                .serialize_state(&mut file)
                .with_context(|| format!("Failed to save screens to {}", path.display()))?;
        }
        if let Some(path) = &self.config.storage.scores_file {
            let mut file =
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            self.scores
                .save(&mut file)
                .with_context(|| format!("Failed to save scores to {}", path.display()))?;
        }
        Ok(())
    }

    /// Run up to `frames` frames, stopping early once the stack is empty
    pub fn run(&mut self, frames: u64, fps: f32) -> SessionSummary {
        let dt = Duration::from_secs_f32(1.0 / fps.max(1.0));
        let mut sink = CountingSink::default();
        let mut summary = SessionSummary::default();

        for frame in 0..frames {
            if self.manager.is_empty() {
                break;
            }
            let mut input = self.scripted_input(frame);
            self.fps.update(dt);

            let report = self.manager.update(dt, &mut input, true);
            summary.events += report.events.len();
            for (source, event) in report.events {
                summary.screens_opened += self.respond(source, event);
            }

            self.manager.draw(&mut sink);
            if self.show_fps {
                self.fps.draw(FONT, &mut sink);
            }
            summary.frames += 1;
        }

        summary.draw_calls = sink.draws;
        summary.batches = sink.batches;
        summary.frame_rate = self.fps.frame_rate();
        summary.final_stack = self
            .manager
            .screens()
            .iter()
            .filter_map(|&id| self.manager.screen(id))
            .map(|s| s.type_name())
            .collect();
        summary
    }

    /// React to a screen event; returns how many screens were opened
    fn respond(&mut self, source: ScreenId, event: ScreenEvent) -> usize {
        let Some(name) = self.manager.screen(source).map(|s| s.type_name()) else {
            return 0;
        };
        debug!(screen = name, ?event, "screen event");

        match (name, event) {
            (MAIN_MENU, ScreenEvent::MenuEntrySelected(PLAY)) => {
                info!("play selected");
                0
            }
            (MAIN_MENU, ScreenEvent::MenuEntrySelected(HIGH_SCORES)) => {
                let Some(table) = self.scores.table(SCORE_TABLE) else {
                    return 0;
                };
                match high_score_screen(
                    Rc::clone(&self.factory.measurer),
                    table,
                    HighScoreFonts::uniform(FONT),
                    self.factory.viewport,
                ) {
                    Ok(screen) => {
                        self.manager.add_screen(Box::new(screen));
                        1
                    }
                    Err(error) => {
                        warn!(%error, "could not build the high-score screen");
                        0
                    }
                }
            }
            (MAIN_MENU, ScreenEvent::MenuEntrySelected(OPTIONS)) => {
                self.manager.add_screen(self.factory.options_menu());
                1
            }
            (MAIN_MENU, ScreenEvent::MenuEntrySelected(EXIT)) => {
                if let Err(error) = self.manager.exit_screen(source) {
                    warn!(%error, "exit failed");
                }
                0
            }
            _ => 0,
        }
    }

    /// The input the script produces for `frame`
    fn scripted_input(&self, frame: u64) -> InputState {
        let touch = |y: f32| TouchSample::new(0, Vec2::new(self.factory.viewport.width / 2.0, y), TouchPhase::Pressed);
        match frame {
            40 => InputState::new().with_gesture(Gesture::tap(self.factory.entry_point(HIGH_SCORES))),
            // Drag the score list up, then let it go
            80 => InputState::new().with_touch(touch(600.0)),
            81..=90 => InputState::new().with_gesture(Gesture::vertical_drag(Vec2::new(240.0, 600.0), -30.0)),
            91 => InputState::new().with_gesture(Gesture::drag_complete()),
            // Flick it further
            120 => InputState::new().with_touch(touch(500.0)),
            121 => InputState::new().with_gesture(Gesture::flick(Vec2::new(0.0, -1500.0))),
            300 => InputState::new().with_back(),
            360 => InputState::new().with_gesture(Gesture::tap(self.factory.entry_point(OPTIONS))),
            420 => InputState::new().with_gesture(Gesture::tap(self.factory.entry_point(0))),
            480 => InputState::new().with_back(),
            560 => InputState::new().with_gesture(Gesture::tap(self.factory.entry_point(EXIT))),
            _ => InputState::new(),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_session_ends_with_empty_stack() {
        let mut session = Session::new(CdxConfig::default());
        session.restore().unwrap();
        let summary = session.run(1000, 60.0);

        // High scores and options were opened, then the main menu exited
        assert_eq!(summary.screens_opened, 2);
        assert!(summary.final_stack.is_empty());
        assert!(summary.frames < 1000);
        assert!(summary.draw_calls > 0);
    }

    #[test]
    fn test_short_run_stops_on_high_scores() {
        let mut session = Session::new(CdxConfig::default());
        session.restore().unwrap();
        let summary = session.run(200, 60.0);
        assert_eq!(summary.frames, 200);
        assert_eq!(summary.final_stack, ["main_menu", "high_scores"]);
    }

    #[test]
    fn test_seeded_scores_fill_the_table() {
        let mut session = Session::new(CdxConfig::default());
        session.restore().unwrap();
        let table = session.scores.table(SCORE_TABLE).unwrap();
        assert_eq!(table.entries()[0].score, 10_000);
        assert!(!table.entries()[SCORE_ROWS - 1].is_placeholder());
    }
}
