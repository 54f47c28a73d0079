//! Control tree management
//!
//! Controls live in a slot-map arena owned by [`ControlTree`] and refer to
//! each other by [`ControlId`]. Each control has a position within its
//! parent and a size that is either computed on demand and cached
//! (auto-size) or fixed by an explicit [`ControlTree::set_size`].
//!
//! Auto-size invalidation walks up the parent chain and stops at the first
//! control with a fixed size.

use std::cell::Cell;
use std::rc::Rc;

use cdx_animation::ScrollTracker;
use cdx_core::{FontId, Size, TextMeasurer, TextureInfo, Vec2};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::button::ButtonControl;
use crate::error::{ControlError, Result};
use crate::image::ImageControl;
use crate::text::TextControl;

new_key_type! {
    pub struct ControlId;
}

/// What a control is and the state specific to that kind
#[derive(Clone, Debug)]
pub enum ControlKind {
    /// Plain container
    Panel,
    /// Container whose children scroll under a fixed viewport
    ScrollingPanel(ScrollTracker),
    Text(TextControl),
    Image(ImageControl),
    Button(ButtonControl),
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Panel => "panel",
            ControlKind::ScrollingPanel(_) => "scrolling panel",
            ControlKind::Text(_) => "text",
            ControlKind::Image(_) => "image",
            ControlKind::Button(_) => "button",
        }
    }
}

pub(crate) struct ControlNode {
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: SmallVec<[ControlId; 4]>,
    pub(crate) position: Vec2,
    pub(crate) visible: bool,
    auto_size: bool,
    size: Cell<Vec2>,
    size_valid: Cell<bool>,
    pub(crate) kind: ControlKind,
}

impl ControlNode {
    fn new(kind: ControlKind) -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            position: Vec2::ZERO,
            visible: true,
            auto_size: true,
            size: Cell::new(Vec2::ZERO),
            size_valid: Cell::new(false),
            kind,
        }
    }
}

/// Arena of controls forming one or more hierarchies
pub struct ControlTree {
    pub(crate) nodes: SlotMap<ControlId, ControlNode>,
    pub(crate) measurer: Rc<dyn TextMeasurer>,
}

impl ControlTree {
    pub fn new(measurer: Rc<dyn TextMeasurer>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            measurer,
        }
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a detached control
    pub fn create(&mut self, kind: ControlKind) -> ControlId {
        self.nodes.insert(ControlNode::new(kind))
    }

    pub fn create_panel(&mut self) -> ControlId {
        self.create(ControlKind::Panel)
    }

    /// Create a scrolling panel showing a `viewport`-sized window of its children
    pub fn create_scrolling_panel(&mut self, viewport: Size) -> ControlId {
        self.create(ControlKind::ScrollingPanel(ScrollTracker::new(viewport)))
    }

    pub fn create_text(&mut self, text: TextControl) -> ControlId {
        self.create(ControlKind::Text(text))
    }

    pub fn create_image(&mut self, image: ImageControl) -> ControlId {
        self.create(ControlKind::Image(image))
    }

    pub fn create_button(&mut self, button: ButtonControl) -> ControlId {
        self.create(ControlKind::Button(button))
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: ControlId) -> Option<&ControlKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub(crate) fn node(&self, id: ControlId) -> Result<&ControlNode> {
        self.nodes.get(id).ok_or(ControlError::UnknownControl(id))
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Result<&mut ControlNode> {
        self.nodes.get_mut(id).ok_or(ControlError::UnknownControl(id))
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `child` to `parent`'s children
    pub fn add_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` in `parent`'s children
    ///
    /// The child must be detached. Moving a control between parents is an
    /// explicit [`detach`](Self::detach) followed by an add.
    pub fn insert_child(&mut self, parent: ControlId, index: usize, child: ControlId) -> Result<()> {
        let len = self.node(parent)?.children.len();
        if let Some(existing) = self.node(child)?.parent {
            return Err(ControlError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(ControlError::WouldCycle { child, parent });
        }
        if index > len {
            return Err(ControlError::IndexOutOfRange { index, len });
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.insert(index, child);
        self.invalidate_auto_size(parent);
        Ok(())
    }

    /// Remove `child` from `parent`; the child stays alive, detached
    pub fn remove_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(ControlError::NotAChild { child, parent })?;
        self.remove_child_at(parent, index).map(|_| ())
    }

    /// Remove and return the child at `index`; it stays alive, detached
    pub fn remove_child_at(&mut self, parent: ControlId, index: usize) -> Result<ControlId> {
        let node = self.node_mut(parent)?;
        let len = node.children.len();
        if index >= len {
            return Err(ControlError::IndexOutOfRange { index, len });
        }
        let child = node.children.remove(index);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
        self.invalidate_auto_size(parent);
        Ok(child)
    }

    /// Detach a control from its parent, if it has one
    pub fn detach(&mut self, id: ControlId) -> Result<()> {
        match self.node(id)?.parent {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(()),
        }
    }

    /// Detach a control and free it together with all its descendants
    pub fn remove(&mut self, id: ControlId) -> Result<()> {
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: ControlId, mut id: ControlId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Position within the parent
    pub fn position(&self, id: ControlId) -> Option<Vec2> {
        self.nodes.get(id).map(|n| n.position)
    }

    /// Move a control within its parent; the parent's auto-size is invalidated
    pub fn set_position(&mut self, id: ControlId, position: Vec2) -> Result<()> {
        let node = self.node_mut(id)?;
        node.position = position;
        if let Some(parent) = node.parent {
            self.invalidate_auto_size(parent);
        }
        Ok(())
    }

    /// Current size, computing and caching it when auto-size is stale
    pub fn size(&self, id: ControlId) -> Option<Vec2> {
        let node = self.nodes.get(id)?;
        if !node.size_valid.get() {
            node.size.set(self.compute_size(id));
            node.size_valid.set(true);
        }
        Some(node.size.get())
    }

    /// Fix the size of a control, disabling auto-size for it
    pub fn set_size(&mut self, id: ControlId, size: Vec2) -> Result<()> {
        let node = self.node_mut(id)?;
        node.size.set(size);
        node.size_valid.set(true);
        node.auto_size = false;
        if let Some(parent) = node.parent {
            self.invalidate_auto_size(parent);
        }
        Ok(())
    }

    pub fn is_auto_size(&self, id: ControlId) -> bool {
        self.nodes.get(id).map(|n| n.auto_size).unwrap_or(false)
    }

    /// Mark a control's computed size stale, then its ancestors'
    ///
    /// Has no effect on a control with a fixed size, and stops there.
    pub fn invalidate_auto_size(&self, id: ControlId) {
        let mut next = Some(id);
        while let Some(id) = next {
            let Some(node) = self.nodes.get(id) else {
                return;
            };
            if !node.auto_size {
                return;
            }
            node.size_valid.set(false);
            next = node.parent;
        }
    }

    /// Size from content, ignoring any cached or fixed size
    ///
    /// Containers span from their origin to the furthest child corner.
    pub fn compute_size(&self, id: ControlId) -> Vec2 {
        let Some(node) = self.nodes.get(id) else {
            return Vec2::ZERO;
        };
        match &node.kind {
            ControlKind::Panel | ControlKind::ScrollingPanel(_) => self.children_bounds(id),
            ControlKind::Text(text) => match text.font {
                Some(font) => self.measurer.measure(font, &text.text),
                None => Vec2::ZERO,
            },
            ControlKind::Image(image) => image.texture.map(|t| t.size()).unwrap_or(Vec2::ZERO),
            ControlKind::Button(button) => button.resolved_size(self.measurer.as_ref()),
        }
    }

    fn children_bounds(&self, id: ControlId) -> Vec2 {
        self.children(id)
            .iter()
            .filter_map(|&child| Some(self.position(child)? + self.size(child)?))
            .reduce(Vec2::max)
            .unwrap_or(Vec2::ZERO)
    }

    pub fn is_visible(&self, id: ControlId) -> bool {
        self.nodes.get(id).map(|n| n.visible).unwrap_or(false)
    }

    /// Hidden controls and their subtrees are skipped when drawing and hit-testing
    pub fn set_visible(&mut self, id: ControlId, visible: bool) -> Result<()> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// Position relative to the root's draw origin
    ///
    /// Includes the scroll offset of every scrolling panel above the control,
    /// so it matches where the control is drawn this frame.
    pub fn screen_origin(&self, id: ControlId) -> Option<Vec2> {
        let mut origin = self.position(id)?;
        let mut next = self.parent(id);
        while let Some(ancestor) = next {
            let node = self.nodes.get(ancestor)?;
            if let ControlKind::ScrollingPanel(tracker) = &node.kind {
                origin -= tracker.view_rect().origin;
            }
            origin += node.position;
            next = node.parent;
        }
        Some(origin)
    }

    // =========================================================================
    // Kind-specific access
    // =========================================================================

    pub fn text(&self, id: ControlId) -> Option<&TextControl> {
        match self.kind(id)? {
            ControlKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replace a label's text, invalidating auto-size when it changed
    pub fn set_text(&mut self, id: ControlId, value: &str) -> Result<()> {
        let changed = {
            let text = self.text_mut(id)?;
            if text.text == value {
                false
            } else {
                text.text = value.to_string();
                true
            }
        };
        if changed {
            self.invalidate_auto_size(id);
        }
        Ok(())
    }

    /// Replace a label's font, invalidating auto-size when it changed
    pub fn set_font(&mut self, id: ControlId, font: FontId) -> Result<()> {
        let changed = {
            let text = self.text_mut(id)?;
            let changed = text.font != Some(font);
            text.font = Some(font);
            changed
        };
        if changed {
            self.invalidate_auto_size(id);
        }
        Ok(())
    }

    fn text_mut(&mut self, id: ControlId) -> Result<&mut TextControl> {
        match &mut self.node_mut(id)?.kind {
            ControlKind::Text(text) => Ok(text),
            _ => Err(ControlError::WrongKind {
                control: id,
                expected: "text",
            }),
        }
    }

    pub fn image(&self, id: ControlId) -> Option<&ImageControl> {
        match self.kind(id)? {
            ControlKind::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn image_mut(&mut self, id: ControlId) -> Option<&mut ImageControl> {
        match &mut self.nodes.get_mut(id)?.kind {
            ControlKind::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Replace an image's texture, invalidating auto-size when it changed
    pub fn set_texture(&mut self, id: ControlId, texture: Option<TextureInfo>) -> Result<()> {
        let changed = {
            let image = self.image_mut(id).ok_or(ControlError::WrongKind {
                control: id,
                expected: "image",
            })?;
            let changed = image.texture != texture;
            image.texture = texture;
            changed
        };
        if changed {
            self.invalidate_auto_size(id);
        }
        Ok(())
    }

    pub fn button(&self, id: ControlId) -> Option<&ButtonControl> {
        match self.kind(id)? {
            ControlKind::Button(button) => Some(button),
            _ => None,
        }
    }

    /// Mutable button access; its auto-size is invalidated since the
    /// caller may change its size or text
    pub fn button_mut(&mut self, id: ControlId) -> Option<&mut ButtonControl> {
        self.invalidate_auto_size(id);
        match &mut self.nodes.get_mut(id)?.kind {
            ControlKind::Button(button) => Some(button),
            _ => None,
        }
    }

    pub fn scroll_tracker(&self, id: ControlId) -> Option<&ScrollTracker> {
        match self.kind(id)? {
            ControlKind::ScrollingPanel(tracker) => Some(tracker),
            _ => None,
        }
    }

    pub fn scroll_tracker_mut(&mut self, id: ControlId) -> Option<&mut ScrollTracker> {
        match &mut self.nodes.get_mut(id)?.kind {
            ControlKind::ScrollingPanel(tracker) => Some(tracker),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ControlTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlTree")
            .field("controls", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdx_core::{MonospaceMeasurer, TextureId};

    fn tree() -> ControlTree {
        ControlTree::new(Rc::new(MonospaceMeasurer::new(10.0, 20.0)))
    }

    fn sized_image(tree: &mut ControlTree, w: f32, h: f32) -> ControlId {
        tree.create_image(ImageControl::new(TextureInfo::new(TextureId(1), w, h)))
    }

    #[test]
    fn test_add_and_remove_child() {
        let mut tree = tree();
        let panel = tree.create_panel();
        let a = tree.create_panel();
        let b = tree.create_panel();

        tree.add_child(panel, a).unwrap();
        tree.insert_child(panel, 0, b).unwrap();
        assert_eq!(tree.children(panel), &[b, a]);
        assert_eq!(tree.parent(a), Some(panel));

        tree.remove_child(panel, a).unwrap();
        assert_eq!(tree.children(panel), &[b]);
        assert_eq!(tree.parent(a), None);
        assert!(tree.contains(a));
    }

    #[test]
    fn test_hierarchy_errors() {
        let mut tree = tree();
        let p = tree.create_panel();
        let q = tree.create_panel();
        let c = tree.create_panel();
        tree.add_child(p, c).unwrap();

        assert_eq!(
            tree.add_child(q, c),
            Err(ControlError::AlreadyParented { child: c, parent: p })
        );
        assert_eq!(
            tree.remove_child(q, c),
            Err(ControlError::NotAChild { child: c, parent: q })
        );
        assert_eq!(
            tree.add_child(c, p),
            Err(ControlError::WouldCycle { child: p, parent: c })
        );
        let loose = tree.create_panel();
        assert_eq!(
            tree.insert_child(q, 3, loose),
            Err(ControlError::IndexOutOfRange { index: 3, len: 0 })
        );
        assert_eq!(
            tree.remove_child_at(q, 0),
            Err(ControlError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_detach_then_reparent() {
        let mut tree = tree();
        let p = tree.create_panel();
        let q = tree.create_panel();
        let c = tree.create_panel();
        tree.add_child(p, c).unwrap();
        tree.detach(c).unwrap();
        tree.add_child(q, c).unwrap();
        assert_eq!(tree.parent(c), Some(q));
        assert!(tree.children(p).is_empty());
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut tree = tree();
        let root = tree.create_panel();
        let mid = tree.create_panel();
        let leaf = tree.create_panel();
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();

        tree.remove(mid).unwrap();
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_container_size_is_furthest_child_corner() {
        let mut tree = tree();
        let panel = tree.create_panel();
        assert_eq!(tree.size(panel), Some(Vec2::ZERO));

        let a = sized_image(&mut tree, 40.0, 10.0);
        let b = sized_image(&mut tree, 10.0, 30.0);
        tree.add_child(panel, a).unwrap();
        tree.add_child(panel, b).unwrap();
        tree.set_position(a, Vec2::new(5.0, 0.0)).unwrap();
        tree.set_position(b, Vec2::new(0.0, 50.0)).unwrap();

        assert_eq!(tree.size(panel), Some(Vec2::new(45.0, 80.0)));
    }

    #[test]
    fn test_text_change_invalidates_ancestors() {
        let mut tree = tree();
        let outer = tree.create_panel();
        let inner = tree.create_panel();
        let label = tree.create_text(TextControl::new("abc", FontId(0)));
        tree.add_child(outer, inner).unwrap();
        tree.add_child(inner, label).unwrap();
        assert_eq!(tree.size(outer), Some(Vec2::new(30.0, 20.0)));

        tree.set_text(label, "abcdef").unwrap();
        assert_eq!(tree.size(outer), Some(Vec2::new(60.0, 20.0)));
    }

    #[test]
    fn test_fixed_size_stops_invalidation() {
        let mut tree = tree();
        let outer = tree.create_panel();
        let fixed = tree.create_panel();
        let label = tree.create_text(TextControl::new("ab", FontId(0)));
        tree.add_child(outer, fixed).unwrap();
        tree.add_child(fixed, label).unwrap();
        tree.set_size(fixed, Vec2::new(100.0, 100.0)).unwrap();
        assert!(!tree.is_auto_size(fixed));

        tree.set_text(label, "a much longer label").unwrap();
        assert_eq!(tree.size(fixed), Some(Vec2::new(100.0, 100.0)));
        assert_eq!(tree.size(outer), Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_text_without_font_has_zero_size() {
        let mut tree = tree();
        let label = tree.create_text(TextControl::empty());
        assert_eq!(tree.size(label), Some(Vec2::ZERO));
        tree.set_font(label, FontId(2)).unwrap();
        assert_eq!(tree.size(label), Some(Vec2::new(0.0, 20.0)));
    }

    #[test]
    fn test_wrong_kind() {
        let mut tree = tree();
        let panel = tree.create_panel();
        assert_eq!(
            tree.set_text(panel, "x"),
            Err(ControlError::WrongKind {
                control: panel,
                expected: "text"
            })
        );
    }

    #[test]
    fn test_screen_origin_accounts_for_scroll() {
        let mut tree = tree();
        let root = tree.create_panel();
        let scroller = tree.create_scrolling_panel(Size::new(100.0, 100.0));
        let item = tree.create_panel();
        tree.add_child(root, scroller).unwrap();
        tree.add_child(scroller, item).unwrap();
        tree.set_position(root, Vec2::new(10.0, 10.0)).unwrap();
        tree.set_position(scroller, Vec2::new(0.0, 20.0)).unwrap();
        tree.set_position(item, Vec2::new(5.0, 300.0)).unwrap();

        assert_eq!(tree.screen_origin(item), Some(Vec2::new(15.0, 330.0)));

        let tracker = tree.scroll_tracker_mut(scroller).unwrap();
        tracker.set_canvas_size(Size::new(100.0, 1000.0));
        tracker.set_view_rect(cdx_core::Rect::new(0.0, 250.0, 100.0, 100.0));
        assert_eq!(tree.screen_origin(item), Some(Vec2::new(15.0, 80.0)));
    }
}
