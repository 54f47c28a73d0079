//! Row and column arrangement of a container's children
//!
//! There is no constraint solver. Screens build their controls and then
//! call one of these to place the children once.

use cdx_core::Vec2;

use crate::error::Result;
use crate::tree::{ControlId, ControlTree};

impl ControlTree {
    /// Stack children top to bottom, `spacing` apart, starting at the margins
    pub fn layout_column(
        &mut self,
        container: ControlId,
        x_margin: f32,
        y_margin: f32,
        spacing: f32,
    ) -> Result<()> {
        let children: Vec<ControlId> = self.node(container)?.children.to_vec();
        let mut y = y_margin;
        for child in children {
            self.set_position(child, Vec2::new(x_margin, y))?;
            y += self.size(child).map(|s| s.y).unwrap_or(0.0) + spacing;
        }
        self.invalidate_auto_size(container);
        Ok(())
    }

    /// Line children up left to right, `spacing` apart, starting at the margins
    pub fn layout_row(
        &mut self,
        container: ControlId,
        x_margin: f32,
        y_margin: f32,
        spacing: f32,
    ) -> Result<()> {
        let children: Vec<ControlId> = self.node(container)?.children.to_vec();
        let mut x = x_margin;
        for child in children {
            self.set_position(child, Vec2::new(x, y_margin))?;
            x += self.size(child).map(|s| s.x).unwrap_or(0.0) + spacing;
        }
        self.invalidate_auto_size(container);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cdx_core::{FontId, MonospaceMeasurer};

    use super::*;
    use crate::text::TextControl;

    fn labels(tree: &mut ControlTree, texts: &[&str]) -> ControlId {
        let panel = tree.create_panel();
        for text in texts {
            let label = tree.create_text(TextControl::new(*text, FontId(0)));
            tree.add_child(panel, label).unwrap();
        }
        panel
    }

    #[test]
    fn test_layout_column() {
        let mut tree = ControlTree::new(Rc::new(MonospaceMeasurer::new(10.0, 20.0)));
        let panel = labels(&mut tree, &["one", "two", "three"]);
        tree.layout_column(panel, 4.0, 8.0, 2.0).unwrap();

        let positions: Vec<Vec2> = tree
            .children(panel)
            .iter()
            .map(|&c| tree.position(c).unwrap())
            .collect();
        assert_eq!(
            positions,
            vec![
                Vec2::new(4.0, 8.0),
                Vec2::new(4.0, 30.0),
                Vec2::new(4.0, 52.0)
            ]
        );
        assert_eq!(tree.size(panel), Some(Vec2::new(54.0, 72.0)));
    }

    #[test]
    fn test_layout_row() {
        let mut tree = ControlTree::new(Rc::new(MonospaceMeasurer::new(10.0, 20.0)));
        let panel = labels(&mut tree, &["ab", "abcd"]);
        tree.layout_row(panel, 0.0, 5.0, 10.0).unwrap();

        let second = tree.children(panel)[1];
        assert_eq!(tree.position(second), Some(Vec2::new(30.0, 5.0)));
        assert_eq!(tree.size(panel), Some(Vec2::new(70.0, 25.0)));
    }
}
