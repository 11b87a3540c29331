//! A padded single-child container.

use crate::{
    core::{
        context::{LayoutCtx, PaintCtx, ReadCtx},
        error::Result,
        layout::Constraints,
        surface::Color,
    },
    geom::{Padding, Point, Rect, Size},
    widget::Widget,
};

/// Wraps one child in padding and centers it in whatever space is left.
///
/// Padding and fill come from the `container/padding` and `container/fill`
/// theme paths unless set explicitly. Extra children are stacked at the
/// same position as the first.
#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Padding, overriding the theme.
    padding: Option<Padding>,
    /// Fill, overriding the theme.
    fill: Option<Color>,
}

impl Container {
    /// A container using theme padding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit padding.
    pub fn with_padding(mut self, p: Padding) -> Self {
        self.padding = Some(p);
        self
    }

    /// Use an explicit fill.
    pub fn with_fill(mut self, c: Color) -> Self {
        self.fill = Some(c);
        self
    }

    /// Effective padding.
    fn padding(&self, ctx: &dyn ReadCtx) -> Padding {
        self.padding
            .unwrap_or_else(|| ctx.theme().padding("container/padding", Padding::default()))
    }
}

impl Widget for Container {
    fn resolve_dimensions(&mut self, ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        let pad = self.padding(ctx);
        let inner = c.deflate(pad).loosen();
        let mut content = Size::zero();
        for child in ctx.children() {
            let s = ctx.resolve_child(child, inner)?;
            content.w = content.w.max(s.w);
            content.h = content.h.max(s.h);
        }
        Ok(c.clamp(pad.outer(content)))
    }

    fn resolve_position(&mut self, ctx: &mut LayoutCtx, p: Point) -> Result<()> {
        let pad = self.padding(ctx);
        let own = ctx.ideal().size();
        let area = pad.inner(own.at(p));
        for child in ctx.children() {
            let s = ctx.child_size(child);
            let at = Point::new(
                area.x + ((area.w - s.w) / 2.0).max(0.0),
                area.y + ((area.h - s.h) / 2.0).max(0.0),
            );
            ctx.position_child(child, at)?;
        }
        Ok(())
    }

    fn paint(&mut self, ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
        let fill = self
            .fill
            .unwrap_or_else(|| ctx.theme().color("container/fill", Color::TRANSPARENT));
        if fill.a > 0 {
            ctx.fill(fill);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Root, widgets::Block};

    #[test]
    fn centers_child_inside_padding() -> Result<()> {
        let mut root = Root::new();
        let c = root.create(Container::new().with_padding(Padding::uniform(2.0)));
        let b = root.create(Block::new(Size::new(4.0, 4.0)));
        root.append_child(c, b)?;
        root.set_child(c)?;
        root.set_constraints(Constraints::tight(Size::new(20.0, 10.0)))?;
        root.frame()?;

        let bounds = |id| root.node(id).map(|n| n.bounds()).unwrap_or_default();
        assert_eq!(bounds(c), Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(bounds(b), Rect::new(8.0, 3.0, 4.0, 4.0));
        Ok(())
    }

    #[test]
    fn theme_padding_change_relayouts() -> Result<()> {
        let mut root = Root::new();
        let c = root.create(Container::new());
        let b = root.create(Block::new(Size::new(4.0, 4.0)));
        root.append_child(c, b)?;
        root.set_child(c)?;
        root.frame()?;
        assert_eq!(root.node(c).map(|n| n.bounds().size()), Some(Size::new(4.0, 4.0)));

        root.theme_mut().set("padding", 3.0);
        root.frame()?;
        assert_eq!(root.node(c).map(|n| n.bounds().size()), Some(Size::new(10.0, 10.0)));
        assert_eq!(root.node(b).map(|n| n.bounds().origin()), Some(Point::new(3.0, 3.0)));
        Ok(())
    }
}
