//! Per-frame update and input routing
//!
//! Both traversals visit a control before its children, children in order.
//! Input is routed through the shared gesture queue of the frame: a button
//! that takes a tap removes it, so controls visited later never see it.

use std::time::Duration;

use cdx_core::{GestureKind, InputState, Rect, Size};
use tracing::trace;

use crate::error::{ControlError, Result};
use crate::event::ControlEvent;
use crate::tree::{ControlId, ControlKind, ControlTree};

impl ControlTree {
    /// Advance scroll physics and button feedback under `root`
    pub fn update(&mut self, root: ControlId, dt: Duration) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        self.update_node(root, dt, &mut events);
        events
    }

    fn update_node(&mut self, id: ControlId, dt: Duration, events: &mut Vec<ControlEvent>) {
        let content = match self.kind(id) {
            Some(ControlKind::ScrollingPanel(_)) => self.compute_size(id).trunc(),
            Some(_) => cdx_core::Vec2::ZERO,
            None => return,
        };

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        match &mut node.kind {
            ControlKind::ScrollingPanel(tracker) => {
                tracker.set_canvas_size(Size::from(content));
                tracker.update(dt);
            }
            ControlKind::Button(button) => {
                if button.tick(dt) {
                    trace!(control = ?id, "button clicked");
                    events.push(ControlEvent::Clicked(id));
                }
            }
            ControlKind::Panel | ControlKind::Text(_) | ControlKind::Image(_) => {}
        }

        let children = node.children.clone();
        for child in children {
            self.update_node(child, dt, events);
        }
    }

    /// Route one frame of input through the visible controls under `root`
    pub fn handle_input(&mut self, root: ControlId, input: &mut InputState) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        self.input_node(root, input, &mut events);
        events
    }

    fn input_node(&mut self, id: ControlId, input: &mut InputState, events: &mut Vec<ControlEvent>) {
        if !self.is_visible(id) {
            return;
        }

        let hit_area = match self.kind(id) {
            Some(ControlKind::Button(button)) => button.click_area.or_else(|| {
                let origin = self.screen_origin(id)?;
                let size = self.size(id)?;
                Some(Rect::from_origin_size(origin, Size::from(size)))
            }),
            _ => None,
        };

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        match &mut node.kind {
            ControlKind::ScrollingPanel(tracker) => tracker.handle_input(input),
            ControlKind::Button(button) => {
                // Only the gesture at the head of the queue is considered
                let tapped = match (input.gestures.first(), hit_area) {
                    (Some(g), Some(area)) => g.kind == GestureKind::Tap && area.contains(g.position),
                    _ => false,
                };
                if tapped {
                    input.consume_gesture(0);
                    button.press();
                    trace!(control = ?id, "button tapped");
                    events.push(ControlEvent::Tapped(id));
                }
            }
            ControlKind::Panel | ControlKind::Text(_) | ControlKind::Image(_) => {}
        }

        let children = node.children.clone();
        for child in children {
            self.input_node(child, input, events);
        }
    }

    /// Check that every control under `root` has what it needs to draw
    ///
    /// Buttons need a normal texture, and a font when they have text.
    /// Labels need a font.
    pub fn validate_resources(&self, root: ControlId) -> Result<()> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            let missing = match &node.kind {
                ControlKind::Button(button) => {
                    if button.normal_texture.is_none() {
                        Some("normal texture")
                    } else if button.text.as_deref().is_some_and(|t| !t.is_empty())
                        && button.font.is_none()
                    {
                        Some("font")
                    } else {
                        None
                    }
                }
                ControlKind::Text(text) if text.font().is_none() => Some("font"),
                _ => None,
            };
            if let Some(resource) = missing {
                return Err(ControlError::MissingResource {
                    control: id,
                    resource,
                });
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cdx_core::{FontId, Gesture, MonospaceMeasurer, TextureId, Vec2};

    use super::*;
    use crate::button::{ButtonControl, ButtonState};
    use crate::text::TextControl;

    fn tree() -> ControlTree {
        ControlTree::new(Rc::new(MonospaceMeasurer::default()))
    }

    fn tap(x: f32, y: f32) -> InputState {
        InputState::new().with_gesture(Gesture::tap(Vec2::new(x, y)))
    }

    #[test]
    fn test_tap_inside_button_is_consumed() {
        let mut tree = tree();
        let root = tree.create_panel();
        let first = tree.create_button(ButtonControl::new(TextureId(1)));
        let second = tree.create_button(ButtonControl::new(TextureId(1)));
        tree.add_child(root, first).unwrap();
        tree.add_child(root, second).unwrap();

        // Overlapping buttons: only the first visited takes the tap
        let mut input = tap(25.0, 25.0);
        let events = tree.handle_input(root, &mut input);
        assert_eq!(events, vec![ControlEvent::Tapped(first)]);
        assert!(input.gestures.is_empty());
        assert_eq!(tree.button(second).unwrap().state(), ButtonState::Normal);
    }

    #[test]
    fn test_tap_outside_button_is_left_in_queue() {
        let mut tree = tree();
        let root = tree.create_panel();
        let button = tree.create_button(ButtonControl::new(TextureId(1)));
        tree.add_child(root, button).unwrap();
        tree.set_position(button, Vec2::new(100.0, 100.0)).unwrap();

        let mut input = tap(25.0, 25.0);
        assert!(tree.handle_input(root, &mut input).is_empty());
        assert_eq!(input.gestures.len(), 1);
    }

    #[test]
    fn test_click_follows_tap_after_feedback() {
        let mut tree = tree();
        let button = tree.create_button(ButtonControl::new(TextureId(1)));
        tree.handle_input(button, &mut tap(10.0, 10.0));

        let frame = Duration::from_millis(50);
        let mut clicked_at = None;
        for tick in 1..=10 {
            let events = tree.update(button, frame);
            if events.contains(&ControlEvent::Clicked(button)) {
                clicked_at = Some(tick);
                break;
            }
        }
        assert_eq!(clicked_at, Some(5));
    }

    #[test]
    fn test_hidden_button_ignores_taps() {
        let mut tree = tree();
        let button = tree.create_button(ButtonControl::new(TextureId(1)));
        tree.set_visible(button, false).unwrap();
        let mut input = tap(10.0, 10.0);
        assert!(tree.handle_input(button, &mut input).is_empty());
        assert_eq!(input.gestures.len(), 1);
    }

    #[test]
    fn test_scrolling_panel_canvas_tracks_content() {
        let mut tree = tree();
        let scroller = tree.create_scrolling_panel(Size::new(100.0, 100.0));
        let label = tree.create_text(TextControl::new("x", FontId(0)));
        tree.add_child(scroller, label).unwrap();
        tree.set_position(label, Vec2::new(0.0, 480.5)).unwrap();

        tree.update(scroller, Duration::from_millis(16));
        let tracker = tree.scroll_tracker(scroller).unwrap();
        assert_eq!(tracker.canvas_rect().height(), 500.0);
        assert_eq!(tracker.canvas_rect().width(), 10.0);
    }

    #[test]
    fn test_button_in_scrolled_panel_hit_at_drawn_position() {
        let mut tree = tree();
        let scroller = tree.create_scrolling_panel(Size::new(100.0, 100.0));
        let button = tree.create_button(ButtonControl::new(TextureId(1)));
        tree.add_child(scroller, button).unwrap();
        tree.set_position(button, Vec2::new(0.0, 400.0)).unwrap();
        tree.scroll_tracker_mut(scroller)
            .unwrap()
            .set_view_rect(Rect::new(0.0, 380.0, 100.0, 100.0));

        let events = tree.handle_input(scroller, &mut tap(10.0, 30.0));
        assert_eq!(events, vec![ControlEvent::Tapped(button)]);
    }

    #[test]
    fn test_validate_resources() {
        let mut tree = tree();
        let root = tree.create_panel();
        let ok = tree.create_button(ButtonControl::new(TextureId(1)).with_text("Go", FontId(0)));
        tree.add_child(root, ok).unwrap();
        assert_eq!(tree.validate_resources(root), Ok(()));

        let no_texture = tree.create_button(ButtonControl::default());
        tree.add_child(root, no_texture).unwrap();
        assert_eq!(
            tree.validate_resources(root),
            Err(ControlError::MissingResource {
                control: no_texture,
                resource: "normal texture"
            })
        );
        tree.remove(no_texture).unwrap();

        let mut textless = ButtonControl::new(TextureId(1));
        textless.text = Some("Go".into());
        let no_font = tree.create_button(textless);
        tree.add_child(root, no_font).unwrap();
        assert_eq!(
            tree.validate_resources(root),
            Err(ControlError::MissingResource {
                control: no_font,
                resource: "font"
            })
        );
        tree.remove(no_font).unwrap();

        let label = tree.create_text(TextControl::empty());
        tree.add_child(root, label).unwrap();
        assert!(tree.validate_resources(root).is_err());
    }
}
