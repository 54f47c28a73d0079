//! Frames-per-second overlay

use std::time::Duration;

use cdx_core::{Color, FontId, RenderSink, Vec2};

const POSITION: Vec2 = Vec2::new(30.0, 25.0);
const WINDOW: Duration = Duration::from_secs(1);

/// Counts draws and publishes the count once per second of update time
#[derive(Clone, Debug, Default)]
pub struct FrameRateCounter {
    elapsed: Duration,
    counter: u32,
    frame_rate: u32,
}

impl FrameRateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, elapsed: Duration) {
        self.elapsed += elapsed;
        if self.elapsed <= WINDOW {
            return;
        }
        self.elapsed -= WINDOW;
        self.frame_rate = self.counter;
        self.counter = 0;
    }

    /// Frames drawn during the last full second
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn label(&self) -> String {
        format!("{} fps", self.frame_rate)
    }

    /// Count this frame and draw the last published rate
    pub fn draw(&mut self, font: FontId, sink: &mut dyn RenderSink) {
        self.counter += 1;
        sink.draw_text(font, &self.label(), POSITION, Color::rgb8(255, 0, 0), 1.0);
    }
}
