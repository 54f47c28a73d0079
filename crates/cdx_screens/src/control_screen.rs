//! A screen that hosts a control tree

use std::time::Duration;

use cdx_core::{DrawContext, GestureSet, InputState};
use cdx_layout::{ControlId, ControlTree};

use crate::screen::{Screen, ScreenContext, ScreenEvent};
use crate::transition::ScreenTransition;

/// Forwards the frame to the controls under `root`
///
/// Control events come back to the host as [`ScreenEvent::Control`]. The
/// back button cancels and exits the screen.
pub struct ControlScreen {
    tree: ControlTree,
    root: ControlId,
    transition: ScreenTransition,
    gestures: GestureSet,
    type_name: &'static str,
}

impl ControlScreen {
    pub fn new(tree: ControlTree, root: ControlId, type_name: &'static str) -> Self {
        Self {
            tree,
            root,
            transition: ScreenTransition::default(),
            gestures: GestureSet::TAP,
            type_name,
        }
    }

    pub fn with_transition(mut self, transition: ScreenTransition) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_gestures(mut self, gestures: GestureSet) -> Self {
        self.gestures = gestures;
        self
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    pub fn root(&self) -> ControlId {
        self.root
    }
}

impl Screen for ControlScreen {
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
        self.gestures
    }

    // Control trees hold resource handles that only mean something to the
    // running host
    fn is_serializable(&self) -> bool {
        false
    }

    fn update(&mut self, elapsed: Duration, ctx: &mut ScreenContext) {
        for event in self.tree.update(self.root, elapsed) {
            ctx.emit(ScreenEvent::Control(event));
        }
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut ScreenContext) {
        if input.back_pressed {
            ctx.emit(ScreenEvent::Cancelled);
            ctx.exit();
            return;
        }
        for event in self.tree.handle_input(self.root, input) {
            ctx.emit(ScreenEvent::Control(event));
        }
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) {
        self.tree.draw_root(self.root, ctx);
    }
}

impl std::fmt::Debug for ControlScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlScreen")
            .field("type_name", &self.type_name)
            .field("root", &self.root)
            .field("transition", &self.transition)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cdx_core::{Gesture, MonospaceMeasurer, TextureId, Vec2};
    use cdx_layout::{ButtonControl, ControlEvent};

    use super::*;

    fn screen_with_button() -> (ControlScreen, ControlId) {
        let mut tree = ControlTree::new(Rc::new(MonospaceMeasurer::default()));
        let root = tree.create_panel();
        let button = tree.create_button(ButtonControl::new(TextureId(1)).with_size(100.0, 40.0));
        tree.add_child(root, button).unwrap();
        tree.set_position(button, Vec2::new(20.0, 20.0)).unwrap();
        (ControlScreen::new(tree, root, "buttons"), button)
    }

    #[test]
    fn test_tap_and_click_surface_as_events() {
        let (mut screen, button) = screen_with_button();
        let mut ctx = ScreenContext::new(Default::default(), Duration::ZERO);
        let mut input = InputState::new().with_gesture(Gesture::tap(Vec2::new(50.0, 30.0)));
        screen.handle_input(&mut input, &mut ctx);
        assert_eq!(ctx.events(), &[ScreenEvent::Control(ControlEvent::Tapped(button))]);

        let mut ctx = ScreenContext::new(Default::default(), Duration::ZERO);
        screen.update(Duration::from_millis(250), &mut ctx);
        assert_eq!(ctx.events(), &[ScreenEvent::Control(ControlEvent::Clicked(button))]);
    }

    #[test]
    fn test_back_cancels() {
        let (mut screen, _) = screen_with_button();
        let mut ctx = ScreenContext::new(Default::default(), Duration::ZERO);
        screen.handle_input(&mut InputState::new().with_back(), &mut ctx);
        assert_eq!(ctx.events(), &[ScreenEvent::Cancelled]);
        assert!(!screen.is_serializable());
    }
}
