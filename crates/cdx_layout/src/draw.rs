//! Draw traversal

use cdx_core::{Color, DrawContext, Rect, Vec2};

use crate::tree::{ControlId, ControlKind, ControlTree};

impl ControlTree {
    /// Draw `root` and its subtree as one batch
    ///
    /// `ctx.offset` is where the root's parent origin would be; the root's
    /// own position is added to it. Nothing is drawn for a hidden root.
    pub fn draw_root(&self, root: ControlId, ctx: &mut DrawContext<'_>) {
        let Some(position) = self.position(root) else {
            return;
        };
        if !self.is_visible(root) {
            return;
        }
        let offset = ctx.offset + position;
        ctx.sink.begin();
        self.draw(root, &mut ctx.at(offset));
        ctx.sink.end();
    }

    /// Draw a control at `ctx.offset`, then its visible children
    pub fn draw(&self, id: ControlId, ctx: &mut DrawContext<'_>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }

        let offset = ctx.offset;
        let alpha = ctx.alpha;
        match &node.kind {
            ControlKind::Panel | ControlKind::ScrollingPanel(_) => {}
            ControlKind::Text(text) => {
                if let Some(font) = text.font {
                    ctx.sink
                        .draw_text(font, &text.text, offset, text.color.faded(alpha), 1.0);
                }
            }
            ControlKind::Image(image) => {
                let size = self.size(id).unwrap_or(Vec2::ZERO);
                let source_size = image.source_size.unwrap_or(size);
                let source = Rect::new(
                    image.source_origin.x.trunc(),
                    image.source_origin.y.trunc(),
                    source_size.x.trunc(),
                    source_size.y.trunc(),
                );
                ctx.sink.draw_texture(
                    image.texture.map(|t| t.id),
                    pixel_rect(offset, size),
                    Some(source),
                    image.color.faded(alpha),
                );
            }
            ControlKind::Button(button) => {
                let size = self.size(id).unwrap_or(Vec2::ZERO);
                ctx.sink.draw_texture(
                    button.current_texture(),
                    pixel_rect(offset, size),
                    None,
                    Color::WHITE.faded(alpha),
                );
                if let (true, Some(text), Some(font)) =
                    (button.text_visible, button.text.as_deref(), button.font)
                {
                    if !text.is_empty() {
                        let position = offset + button.text_offset(size, self.measurer());
                        ctx.sink.draw_text(
                            font,
                            text,
                            position,
                            button.current_foreground().faded(alpha),
                            button.text_scale.factor(),
                        );
                    }
                }
            }
        }

        let scroll = match &node.kind {
            ControlKind::ScrollingPanel(tracker) => tracker.view_rect().origin,
            _ => Vec2::ZERO,
        };
        for &child in &node.children {
            let Some(position) = self.position(child) else {
                continue;
            };
            self.draw(child, &mut ctx.at(offset - scroll + position));
        }
    }
}

fn pixel_rect(origin: Vec2, size: Vec2) -> Rect {
    let origin = origin.trunc();
    let size = size.trunc();
    Rect::new(origin.x, origin.y, size.x, size.y)
}
